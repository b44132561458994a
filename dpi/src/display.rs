use crate::dto::frame::CapturedFrame;

pub const DEFAULT_BYTES_PER_LINE: usize = 16;
pub const TIME_FORMAT: &str = "%H:%M:%S";

impl CapturedFrame {
    /// Local capture time, e.g. `14:03:59`.
    pub fn time_string(&self) -> String {
        self.captured_at()
            .map(|time| time.format(TIME_FORMAT).to_string())
            .unwrap_or_default()
    }

    pub fn hex_preview(&self, max_bytes: usize) -> String {
        hex_preview(&self.snapshot, max_bytes)
    }

    pub fn hex_dump(&self) -> Vec<String> {
        hex_dump(&self.snapshot, DEFAULT_BYTES_PER_LINE)
    }
}

/// `45 00 00 3c` style preview of the first `max_bytes` bytes.
pub fn hex_preview(bytes: &[u8], max_bytes: usize) -> String {
    bytes
        .iter()
        .take(max_bytes)
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<String>>()
        .join(" ")
}

/// Classic offset / hex / ASCII dump. The last line is padded so the ASCII
/// column stays aligned.
pub fn hex_dump(bytes: &[u8], bytes_per_line: usize) -> Vec<String> {
    if bytes_per_line == 0 {
        return vec![];
    }

    bytes
        .chunks(bytes_per_line)
        .enumerate()
        .map(|(index, line)| {
            let mut hex = String::with_capacity(bytes_per_line * 3);
            let mut ascii = String::with_capacity(bytes_per_line);

            for position in 0..bytes_per_line {
                match line.get(position) {
                    Some(byte) => {
                        hex.push_str(&format!("{:02x} ", byte));
                        ascii.push(printable(*byte));
                    },
                    None => {
                        hex.push_str("   ");
                        ascii.push(' ');
                    },
                }
            }

            format!("{:08x}: {} {}", index * bytes_per_line, hex, ascii)
        })
        .collect()
}

fn printable(byte: u8) -> char {
    if byte.is_ascii_graphic() || byte == b' ' {
        byte as char
    } else {
        '.'
    }
}
