//! Character display and connection indicator interfaces

use log::info;

/// Character LCD style text sink. Writes are fire-and-forget.
pub trait TextDisplay {
    fn set_cursor(&mut self, col: u8, row: u8);
    fn print(&mut self, text: &str);
}

/// Connection indicator (an LED on the real board)
pub trait StatusIndicator {
    fn set(&mut self, on: bool);
}

/// Display that mirrors a fixed-size character grid into the log
#[derive(Debug, Clone)]
pub struct LogDisplay {
    rows: Vec<Vec<char>>,
    cursor: (usize, usize),
}

impl LogDisplay {
    pub fn new(columns: u8, rows: u8) -> Self {
        Self {
            rows: vec![vec![' '; columns as usize]; rows as usize],
            cursor: (0, 0),
        }
    }

    pub fn row(&self, row: usize) -> Option<String> {
        self.rows.get(row).map(|cells| cells.iter().collect())
    }
}

impl TextDisplay for LogDisplay {
    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (col as usize, row as usize);
    }

    fn print(&mut self, text: &str) {
        let (mut col, row) = self.cursor;
        if let Some(cells) = self.rows.get_mut(row) {
            for c in text.chars() {
                // Characters past the right edge are lost, as on the LCD
                if let Some(cell) = cells.get_mut(col) {
                    *cell = c;
                }
                col += 1;
            }
            self.cursor.0 = col;
            info!("[lcd {}] |{}|", row, cells.iter().collect::<String>());
        }
    }
}

/// Indicator that reports changes through the log
#[derive(Debug, Default)]
pub struct LogIndicator {
    on: bool,
}

impl LogIndicator {
    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl StatusIndicator for LogIndicator {
    fn set(&mut self, on: bool) {
        if on != self.on {
            info!("Link indicator {}", if on { "on" } else { "off" });
        }
        self.on = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_display_overwrites_and_clips() {
        let mut display = LogDisplay::new(8, 2);
        display.set_cursor(0, 1);
        display.print("abcdefghij");
        assert_eq!(display.row(1).unwrap(), "abcdefgh");

        display.set_cursor(2, 1);
        display.print("XY");
        assert_eq!(display.row(1).unwrap(), "abXYefgh");
        assert_eq!(display.row(0).unwrap(), "        ");
        assert!(display.row(2).is_none());
    }

    #[test]
    fn test_log_indicator_tracks_state() {
        let mut indicator = LogIndicator::default();
        indicator.set(true);
        assert!(indicator.is_on());
        indicator.set(false);
        assert!(!indicator.is_on());
    }
}
