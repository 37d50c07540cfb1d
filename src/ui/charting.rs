/// Reaction times as (shot number, ms) points, numbered from 1
pub fn reaction_coords(reaction_times: &[u64]) -> Vec<(f64, f64)> {
    reaction_times
        .iter()
        .enumerate()
        .map(|(i, &rt)| ((i + 1) as f64, rt as f64))
        .collect()
}

/// Compute X (hit number) and Y (reaction ms) bounds for the results chart
pub fn compute_chart_params(coords: &[(f64, f64)]) -> (f64, f64) {
    let slowest = coords.iter().map(|&(_, ms)| ms).fold(0.0, f64::max);
    let hits = coords.last().map_or(1.0, |&(n, _)| n).max(2.0);

    // headroom so the slowest hit does not sit on the frame
    (hits, (slowest * 1.1).round().max(100.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_chart_params_empty() {
        let (x, y) = compute_chart_params(&[]);
        assert_eq!(x, 2.0);
        assert_eq!(y, 100.0);
    }

    #[test]
    fn test_compute_chart_params() {
        let coords = reaction_coords(&[250, 400, 310]);
        assert_eq!(coords[1], (2.0, 400.0));
        assert_eq!(compute_chart_params(&coords), (3.0, 440.0));
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(1.2345), "1.23");
    }
}
