//! Distance and direction lines on the character display
//!
//! Rows are only rewritten when their value changes, which keeps a slow
//! LCD bus quiet while the peers stand still.

use crate::algorithms::CompassSector;
use crate::hardware::TextDisplay;

pub const DISTANCE_ROW: u8 = 0;
pub const BEARING_ROW: u8 = 1;

/// Values currently shown on the display
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayState {
    pub last_distance: Option<f64>,
    pub last_bearing: Option<f64>,
}

pub fn format_distance(yards: f64) -> String {
    format!("{:.2} yards", yards)
}

pub fn format_bearing(bearing_deg: f64, sector: CompassSector) -> String {
    format!("Dir: {} {:.0} deg", sector, bearing_deg)
}

/// Pad with spaces or cut to exactly `columns` characters
pub fn fit_line(text: &str, columns: u8) -> String {
    let columns = columns as usize;
    let mut line: String = text.chars().take(columns).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(columns - len));
    line
}

/// Display plus the change-only push policy
pub struct StatusDisplay<D> {
    display: D,
    columns: u8,
    state: DisplayState,
}

impl<D: TextDisplay> StatusDisplay<D> {
    pub fn new(display: D, columns: u8) -> Self {
        Self {
            display,
            columns,
            state: DisplayState::default(),
        }
    }

    /// Returns whether the row was rewritten
    pub fn show_distance(&mut self, yards: f64) -> bool {
        if self.state.last_distance == Some(yards) {
            return false;
        }
        self.write_row(DISTANCE_ROW, &format_distance(yards));
        self.state.last_distance = Some(yards);
        true
    }

    /// Returns whether the row was rewritten
    pub fn show_bearing(&mut self, bearing_deg: f64, sector: CompassSector) -> bool {
        if self.state.last_bearing == Some(bearing_deg) {
            return false;
        }
        self.write_row(BEARING_ROW, &format_bearing(bearing_deg, sector));
        self.state.last_bearing = Some(bearing_deg);
        true
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn inner(&self) -> &D {
        &self.display
    }

    fn write_row(&mut self, row: u8, text: &str) {
        self.display.set_cursor(0, row);
        self.display.print(&fit_line(text, self.columns));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MockDisplay;

    #[test]
    fn test_line_formats() {
        assert_eq!(format_distance(70.087), "70.09 yards");
        assert_eq!(format_distance(0.0), "0.00 yards");
        assert_eq!(format_bearing(292.7, CompassSector::WNW), "Dir: WNW 293 deg");
        assert_eq!(format_bearing(4.2, CompassSector::N), "Dir: N 4 deg");
    }

    #[test]
    fn test_fit_line() {
        assert_eq!(fit_line("abc", 6), "abc   ");
        assert_eq!(fit_line("12345.67 yards", 8), "12345.67");
        assert_eq!(fit_line("Dir: WNW 293 deg", 16), "Dir: WNW 293 deg");
    }

    #[test]
    fn test_rows_only_rewritten_on_change() {
        let mut status = StatusDisplay::new(MockDisplay::new(), 16);

        assert!(status.show_distance(12.5));
        assert!(!status.show_distance(12.5));
        assert!(status.show_distance(12.51));

        assert!(status.show_bearing(90.0, CompassSector::E));
        assert!(!status.show_bearing(90.0, CompassSector::E));

        let display = status.inner();
        assert_eq!(display.writes_to_row(DISTANCE_ROW).len(), 2);
        assert_eq!(display.writes_to_row(BEARING_ROW), vec!["Dir: E 90 deg   "]);
        assert_eq!(display.last_on_row(DISTANCE_ROW), Some("12.51 yards     "));
        assert_eq!(
            status.state(),
            DisplayState {
                last_distance: Some(12.51),
                last_bearing: Some(90.0),
            }
        );
    }

    #[test]
    fn test_shorter_value_clears_stale_text() {
        let mut status = StatusDisplay::new(MockDisplay::new(), 16);
        status.show_distance(1234.56);
        status.show_distance(7.0);
        let last = status.inner().last_on_row(DISTANCE_ROW).unwrap();
        assert_eq!(last.len(), 16);
        assert_eq!(last.trim_end(), "7.00 yards");
    }
}
