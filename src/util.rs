//! Summary helpers over reaction-time and accuracy samples.
//!
//! Every helper returns 0 for empty input rather than `None`, since the
//! results feed straight into display and scoring.

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Rounded arithmetic mean.
pub fn average(data: &[f64]) -> f64 {
    mean(data).map(f64::round).unwrap_or(0.0)
}

/// Middle value; for an even count the rounded mean of the two middle values.
pub fn median(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sorted = sorted(data);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 != 0 {
        sorted[mid]
    } else {
        ((sorted[mid - 1] + sorted[mid]) / 2.0).round()
    }
}

/// Percentile in `[0, 100]` with linear interpolation between order statistics.
pub fn percentile(data: &[f64], p: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sorted = sorted(data);
    let index = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    sorted[lower] + (sorted[upper] - sorted[lower]) * (index - lower as f64)
}

/// Population standard deviation, rounded. Zero for fewer than two samples.
///
/// Works from the rounded mean and averages the rounded squared deviations,
/// so results match what the scoreboard shows for the mean.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let avg = average(data);
    let square_diffs = data
        .iter()
        .map(|value| {
            let diff = value - avg;

            diff * diff
        })
        .collect::<Vec<f64>>();
    average(&square_diffs).sqrt().round()
}

pub fn as_samples(values: &[u64]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
