use carpool_shared::{RideStatus, SeatStatus};

/// Badge text and color for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub label: &'static str,
    /// `#RRGGBB`
    pub color: &'static str,
}

const fn style(label: &'static str, color: &'static str) -> StatusStyle {
    StatusStyle { label, color }
}

pub fn ride_status_style(status: RideStatus) -> StatusStyle {
    match status {
        RideStatus::Awaiting => style("Awaiting", "#FFC107"),
        RideStatus::Confirmed => style("Confirmed", "#4CAF50"),
        RideStatus::Active => style("Active", "#2196F3"),
        RideStatus::Cancelled => style("Cancelled", "#FF5252"),
        RideStatus::Complete => style("Complete", "#666666"),
    }
}

/// Seats read as a traffic light: open, waiting on the driver, gone
pub fn seat_status_style(status: SeatStatus) -> StatusStyle {
    match status {
        SeatStatus::Free => style("Available", "#4CAF50"),
        SeatStatus::Pending => style("Pending", "#FFC107"),
        SeatStatus::Taken => style("Taken", "#FF5252"),
    }
}
