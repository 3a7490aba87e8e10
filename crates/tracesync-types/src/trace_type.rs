use serde::{Deserialize, Serialize};
use std::fmt;

/// Subsystem that produced a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceType {
    ScreenRecording,
    Screenshot,
    SurfaceFlinger,
    Transactions,
    WindowManager,
    ProtoLog,
    InputMethodClients,
    InputMethodService,
    InputMethodManagerService,
    ViewCapture,
    EventLog,
    WmTransitions,
    ShellTransitions,
}

impl TraceType {
    pub const ALL: [TraceType; 13] = [
        TraceType::ScreenRecording,
        TraceType::Screenshot,
        TraceType::SurfaceFlinger,
        TraceType::Transactions,
        TraceType::WindowManager,
        TraceType::ProtoLog,
        TraceType::InputMethodClients,
        TraceType::InputMethodService,
        TraceType::InputMethodManagerService,
        TraceType::ViewCapture,
        TraceType::EventLog,
        TraceType::WmTransitions,
        TraceType::ShellTransitions,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TraceType::ScreenRecording => "Screen Recording",
            TraceType::Screenshot => "Screenshot",
            TraceType::SurfaceFlinger => "Surface Flinger",
            TraceType::Transactions => "Transactions",
            TraceType::WindowManager => "Window Manager",
            TraceType::ProtoLog => "ProtoLog",
            TraceType::InputMethodClients => "IME Clients",
            TraceType::InputMethodService => "IME Service",
            TraceType::InputMethodManagerService => "IME Manager Service",
            TraceType::ViewCapture => "View Capture",
            TraceType::EventLog => "Event Log",
            TraceType::WmTransitions => "WM Transitions",
            TraceType::ShellTransitions => "Shell Transitions",
        }
    }

    pub fn is_input_method(&self) -> bool {
        matches!(
            self,
            TraceType::InputMethodClients
                | TraceType::InputMethodService
                | TraceType::InputMethodManagerService
        )
    }
}

impl fmt::Display for TraceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
