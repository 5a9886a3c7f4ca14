/// Scale up to the next unit only once the value reaches this many of the
/// current one, so 1100 bytes stays "1100.00B" rather than "1.07K".
const SCALE_THRESHOLD: f64 = 1024.0 * 1.2;

const UNITS: [&str; 4] = ["B", "K", "M", "G"];

/// Format a raw byte count with two decimals: "93.98G"
pub fn fmt_bytes(bytes: u64) -> String {
    fmt_bytes_f(bytes as f64)
}

pub fn fmt_bytes_f(b: f64) -> String {
    let mut value = b;
    let mut unit  = 0;
    while value >= SCALE_THRESHOLD && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit  += 1;
    }
    format!("{:.2}{}", value, UNITS[unit])
}
