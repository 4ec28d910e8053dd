use rand::Rng;
use rand::seq::SliceRandom;

/// Lowest/highest probability handed to an inverse CDF. Keeps unbounded
/// distributions away from their infinite tails.
const P_FLOOR: f64 = 1e-12;

/// `n` uniforms, one per stratum `[i/n, (i+1)/n)`, in shuffled order.
pub fn stratified_uniforms<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f64> {
    let width = 1.0 / n as f64;
    let mut points: Vec<f64> = (0..n)
        .map(|i| clamp_probability((i as f64 + rng.r#gen::<f64>()) * width))
        .collect();
    points.shuffle(rng);
    points
}

pub fn independent_uniforms<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| clamp_probability(rng.r#gen::<f64>()))
        .collect()
}

fn clamp_probability(p: f64) -> f64 {
    p.clamp(P_FLOOR, 1.0 - P_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn one_point_per_stratum() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 50;
        let mut points = stratified_uniforms(&mut rng, n);
        points.sort_by(|a, b| a.total_cmp(b));
        for (i, p) in points.iter().enumerate() {
            let lo = i as f64 / n as f64;
            let hi = (i + 1) as f64 / n as f64;
            assert!(*p >= lo - 1e-12 && *p <= hi, "point {p} outside stratum {i}");
        }
    }

    #[test]
    fn probabilities_stay_inside_open_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        for p in independent_uniforms(&mut rng, 1000) {
            assert!(p > 0.0 && p < 1.0);
        }
    }
}
