use std::collections::BTreeMap;
use tracesync_core::Traces;
use tracesync_engine::{FrameMapper, FrameMapperOptions, FrameTable};
use tracesync_testing::{TraceBuilder, TracesBuilder, extract_traces_frames, init_test_logging};
use tracesync_types::{Error, FramesRange, TraceType};

const MS: i64 = 1_000_000;

fn layout(entries: &[(TraceType, Vec<usize>)]) -> BTreeMap<TraceType, Vec<usize>> {
    entries.iter().cloned().collect()
}

/// Full UI pipeline: recording -> SF -> transactions -> WM -> ProtoLog / IME
fn pipeline_traces() -> Traces {
    TracesBuilder::new()
        .timestamps(TraceType::ScreenRecording, &[10, 20, 30])
        .timestamps(TraceType::SurfaceFlinger, &[5, 8, 15, 25])
        .vsync_ids(TraceType::SurfaceFlinger, &[100, 101, 102, 103])
        .timestamps(TraceType::Transactions, &[6, 7, 14, 22, 24])
        .vsync_ids(TraceType::Transactions, &[101, 101, 102, 103, 999])
        .timestamps(TraceType::WindowManager, &[1, 13, 23])
        .timestamps(TraceType::ProtoLog, &[0, 2, 13, 20, 30])
        .timestamps(TraceType::InputMethodClients, &[12, 13 + 300 * MS])
        .build()
}

#[tokio::test]
async fn test_proto_log_follows_window_manager() {
    init_test_logging();
    let traces = TracesBuilder::new()
        .timestamps(TraceType::ProtoLog, &[0, 1, 2, 4, 5, 6])
        .timestamps(TraceType::WindowManager, &[3, 5])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    let frames = extract_traces_frames(&traces).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(
        frames[&0],
        layout(&[
            (TraceType::WindowManager, vec![0]),
            (TraceType::ProtoLog, vec![0, 1, 2]),
        ])
    );
    assert_eq!(
        frames[&1],
        layout(&[
            (TraceType::WindowManager, vec![1]),
            (TraceType::ProtoLog, vec![3, 4]),
        ])
    );

    // Logs after the last WM entry stay unassigned
    let proto_log = traces.get_trace(TraceType::ProtoLog).unwrap();
    assert_eq!(proto_log.get_entry(5).unwrap().frames_range().unwrap(), None);
}

#[tokio::test]
async fn test_full_pipeline() {
    init_test_logging();
    let traces = pipeline_traces();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    let frames = extract_traces_frames(&traces).unwrap();
    assert_eq!(frames.len(), 3);
    assert_eq!(
        frames[&0],
        layout(&[
            (TraceType::ScreenRecording, vec![0]),
            (TraceType::SurfaceFlinger, vec![1]),
            (TraceType::Transactions, vec![0, 1]),
            (TraceType::WindowManager, vec![0]),
            (TraceType::ProtoLog, vec![0]),
        ])
    );
    assert_eq!(
        frames[&1],
        layout(&[
            (TraceType::ScreenRecording, vec![1]),
            (TraceType::SurfaceFlinger, vec![2]),
            (TraceType::Transactions, vec![2]),
            (TraceType::WindowManager, vec![1]),
            (TraceType::ProtoLog, vec![1, 2]),
            (TraceType::InputMethodClients, vec![0]),
        ])
    );
    assert_eq!(
        frames[&2],
        layout(&[
            (TraceType::ScreenRecording, vec![2]),
            (TraceType::SurfaceFlinger, vec![3]),
            (TraceType::Transactions, vec![3]),
            (TraceType::WindowManager, vec![1]),
            (TraceType::ProtoLog, vec![1, 2]),
            (TraceType::InputMethodClients, vec![0]),
        ])
    );

    insta::assert_json_snapshot!("pipeline_frame_table", FrameTable::from_traces(&traces).unwrap());
}

#[tokio::test]
async fn test_unmatched_entries_have_no_frames() {
    let traces = pipeline_traces();
    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    // SF entry before the first recording sample window has no frame
    let sf = traces.get_trace(TraceType::SurfaceFlinger).unwrap();
    assert_eq!(sf.get_entry(0).unwrap().frames_range().unwrap(), None);

    // Transaction with an unknown vsync id
    let transactions = traces.get_trace(TraceType::Transactions).unwrap();
    assert_eq!(transactions.get_entry(-1).unwrap().frames_range().unwrap(), None);

    // IME entry too far from any WM entry
    let ime = traces.get_trace(TraceType::InputMethodClients).unwrap();
    assert_eq!(ime.get_entry(1).unwrap().frames_range().unwrap(), None);
}

#[tokio::test]
async fn test_screen_recording_seeds_identity_map() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::ScreenRecording, &[10, 20])
        .timestamps(TraceType::WindowManager, &[15])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    let recording = traces.get_trace(TraceType::ScreenRecording).unwrap();
    for index in 0..2 {
        let frames = recording.get_entry(index).unwrap().frames_range().unwrap();
        assert_eq!(frames.map(|f| (f.start, f.end)), Some((index as usize, index as usize + 1)));
    }

    // No SF or transactions between the recording and WM
    let wm = traces.get_trace(TraceType::WindowManager).unwrap();
    assert!(!wm.has_frame_info());
}

#[tokio::test]
async fn test_window_manager_seeds_without_recording_or_sf() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::WindowManager, &[1, 2, 3])
        .timestamps(TraceType::EventLog, &[2])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    let wm = traces.get_trace(TraceType::WindowManager).unwrap();
    assert!(wm.has_frame_info());
    assert_eq!(wm.frames_range().unwrap().map(|f| (f.start, f.end)), Some((0, 3)));

    // Event log has no propagation step
    assert!(!traces.get_trace(TraceType::EventLog).unwrap().has_frame_info());
}

#[tokio::test]
async fn test_no_seed_no_frames() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::ProtoLog, &[1, 2])
        .timestamps(TraceType::InputMethodClients, &[1])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    assert!(traces.iter().all(|trace| !trace.has_frame_info()));
    assert!(matches!(
        traces.frames_range(),
        Err(Error::NoFrameInfo(_))
    ));
}

#[tokio::test]
async fn test_missing_vsync_ids_skip_transactions() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::ScreenRecording, &[10])
        .timestamps(TraceType::SurfaceFlinger, &[5])
        .timestamps(TraceType::Transactions, &[4])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    assert!(traces.get_trace(TraceType::SurfaceFlinger).unwrap().has_frame_info());
    assert!(!traces.get_trace(TraceType::Transactions).unwrap().has_frame_info());
}

#[tokio::test]
async fn test_ime_latency_cap_is_configurable() {
    let build = || {
        TracesBuilder::new()
            .timestamps(TraceType::WindowManager, &[0])
            .timestamps(TraceType::InputMethodService, &[50 * MS])
            .build()
    };

    let traces = build();
    FrameMapper::new(&traces).compute_mapping().await.unwrap();
    let ime = traces.get_trace(TraceType::InputMethodService).unwrap();
    assert!(ime.get_entry(0).unwrap().frames_range().unwrap().is_some());

    let traces = build();
    let options = FrameMapperOptions {
        max_ime_wm_latency_ns: 10 * MS as u64,
        ..FrameMapperOptions::default()
    };
    FrameMapper::with_options(&traces, options)
        .compute_mapping()
        .await
        .unwrap();
    let ime = traces.get_trace(TraceType::InputMethodService).unwrap();
    assert_eq!(ime.get_entry(0).unwrap().frames_range().unwrap(), None);
}

#[tokio::test]
async fn test_surface_flinger_window_is_bounded_by_pipeline_latency() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::ScreenRecording, &[1_000 * MS, 4_000 * MS])
        .timestamps(TraceType::SurfaceFlinger, &[500 * MS, 1_500 * MS])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    let sf = traces.get_trace(TraceType::SurfaceFlinger).unwrap();
    assert_eq!(sf.get_entry(0).unwrap().frames_range().unwrap(), Some(FramesRange::new(0, 1)));
    // 2.5s before the second recording sample
    assert_eq!(sf.get_entry(1).unwrap().frames_range().unwrap(), None);
}

#[tokio::test]
async fn test_last_window_manager_entry_takes_trailing_transactions() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::ScreenRecording, &[10, 20, 3_000 * MS + 20])
        .timestamps(TraceType::SurfaceFlinger, &[5, 15, 3_000 * MS + 15])
        .vsync_ids(TraceType::SurfaceFlinger, &[1, 2, 3])
        .timestamps(TraceType::Transactions, &[4, 12, 14, 2_000 * MS + 12])
        .vsync_ids(TraceType::Transactions, &[1, 2, 2, 3])
        .timestamps(TraceType::WindowManager, &[3, 11])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    let wm = traces.get_trace(TraceType::WindowManager).unwrap();
    assert_eq!(wm.get_entry(0).unwrap().frames_range().unwrap(), Some(FramesRange::new(0, 1)));
    // The transaction 2s after the last WM entry is out of reach
    assert_eq!(wm.get_entry(1).unwrap().frames_range().unwrap(), Some(FramesRange::new(1, 2)));
}

#[tokio::test]
async fn test_proto_log_window_before_first_window_manager_entry() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::WindowManager, &[3_000 * MS])
        .timestamps(TraceType::ProtoLog, &[500 * MS, 1_500 * MS, 3_000 * MS])
        .build();

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    let proto_log = traces.get_trace(TraceType::ProtoLog).unwrap();
    assert_eq!(proto_log.get_entry(0).unwrap().frames_range().unwrap(), None);
    for index in 1..3 {
        assert_eq!(
            proto_log.get_entry(index).unwrap().frames_range().unwrap(),
            Some(FramesRange::new(0, 1))
        );
    }
}

#[tokio::test]
async fn test_extreme_pipeline_latency_does_not_overflow() {
    let options = FrameMapperOptions {
        max_ui_pipeline_latency_ns: i64::MIN,
        ..FrameMapperOptions::default()
    };
    let recording = TracesBuilder::new()
        .timestamps(TraceType::ScreenRecording, &[10])
        .timestamps(TraceType::SurfaceFlinger, &[5])
        .build();
    let window_manager = TracesBuilder::new()
        .timestamps(TraceType::WindowManager, &[3])
        .timestamps(TraceType::ProtoLog, &[1, 3])
        .build();

    for traces in [&recording, &window_manager] {
        FrameMapper::with_options(traces, options)
            .compute_mapping()
            .await
            .unwrap();
        assert!(traces.iter().all(|trace| trace.has_frame_info()));
    }
}

#[tokio::test]
async fn test_sliced_trace_maps_its_full_trace() {
    let wm = TraceBuilder::<i64>::new(TraceType::WindowManager)
        .entries(vec![1, 2, 3, 4])
        .timestamps(&[1, 2, 3, 4])
        .build()
        .erase();
    let proto_log = TraceBuilder::<i64>::new(TraceType::ProtoLog)
        .entries(vec![0, 2, 5])
        .timestamps(&[0, 2, 5])
        .build()
        .erase();
    let wm_slice = wm.slice_entries(Some(1), None);
    let mut traces = Traces::new();
    traces.add_trace(wm_slice.clone());
    traces.add_trace(proto_log);

    FrameMapper::new(&traces).compute_mapping().await.unwrap();

    assert!(wm_slice.full_trace().has_frame_info());
    assert_eq!(wm.full_trace().frames_range().unwrap(), Some(FramesRange::new(0, 4)));

    let proto_log = traces.get_trace(TraceType::ProtoLog).unwrap();
    assert_eq!(proto_log.get_entry(0).unwrap().frames_range().unwrap(), Some(FramesRange::new(0, 1)));
    assert_eq!(proto_log.get_entry(1).unwrap().frames_range().unwrap(), Some(FramesRange::new(1, 2)));
}

#[tokio::test]
async fn test_mapping_runs_once() {
    let traces = TracesBuilder::new()
        .timestamps(TraceType::WindowManager, &[1, 2])
        .build();
    let mapper = FrameMapper::new(&traces);

    mapper.compute_mapping().await.unwrap();
    let result = mapper.compute_mapping().await;

    assert!(matches!(
        result,
        Err(Error::FrameInfoAlreadySet(TraceType::WindowManager))
    ));
}

#[test]
fn test_default_options() {
    let options = FrameMapperOptions::default();
    assert_eq!(options.max_ui_pipeline_latency_ns, 2_000_000_000);
    assert_eq!(options.max_ime_wm_latency_ns, 200_000_000);
}
