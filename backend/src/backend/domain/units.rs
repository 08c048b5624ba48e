//! Unit conversion and display helpers for weights and durations.
//!
//! Weights are entered on the scale as a pounds + ounces pair and stored on
//! growth records as fractional pounds. Ounce arithmetic rounds *up* to one
//! decimal place.

const OUNCES_PER_POUND: f64 = 16.0;

/// Convert a pounds + ounces pair into total ounces
pub fn pounds_ounces_to_ounces(pounds: f64, ounces: f64) -> f64 {
    pounds * OUNCES_PER_POUND + ounces
}

/// Round a value up to one decimal place
pub fn ceil_to_tenth(value: f64) -> f64 {
    (value * 10.0).ceil() / 10.0
}

/// Ounces gained between two weighings, rounded up to one decimal.
///
/// The result is negative when the end weight is lower and is never clamped.
pub fn ounce_delta(start_lb: f64, start_oz: f64, end_lb: f64, end_oz: f64) -> f64 {
    let start = pounds_ounces_to_ounces(start_lb, start_oz);
    let end = pounds_ounces_to_ounces(end_lb, end_oz);
    ceil_to_tenth(end - start)
}

/// Render fractional pounds as "N pound(s) and M ounce(s)".
///
/// An ounce remainder that rounds to 16.0 is not carried into the pound part.
pub fn format_pounds_ounces(weight_lb: f64) -> String {
    let pounds = weight_lb.floor();
    let ounces = ((weight_lb - pounds) * OUNCES_PER_POUND * 10.0).round() / 10.0;
    format!("{} pound(s) and {} ounce(s)", pounds, ounces)
}

/// Render a minute count as "H hour(s) M minute(s)", dropping zero segments
pub fn format_minutes_duration(total_minutes: u64) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match (hours, minutes) {
        (0, 0) => "0 minute(s)".to_string(),
        (0, m) => format!("{} minute(s)", m),
        (h, 0) => format!("{} hour(s)", h),
        (h, m) => format!("{} hour(s) {} minute(s)", h, m),
    }
}

/// Uppercase the first character of every space-separated word
pub fn to_title_case(words: &str) -> String {
    words
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
