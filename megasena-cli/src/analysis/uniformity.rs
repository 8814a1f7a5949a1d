use megasena_db::models::BOARD_SIZE;

use super::Tally;

const SIGNIFICANCE: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct UniformityResult {
    pub statistic: f64,
    pub p_value: f64,
    /// p < 0.05 ⇒ a hipótese de uniformidade é rejeitada.
    pub biased: bool,
}

/// Teste qui-quadrado de aderência das 60 frequências observadas contra a
/// expectativa uniforme, com 59 graus de liberdade. Sem dados, devolve um
/// resultado neutro em vez de falhar.
pub fn chi_square_uniformity(tally: &Tally) -> UniformityResult {
    let expected = tally.expected();
    if expected <= 0.0 {
        return UniformityResult {
            statistic: 0.0,
            p_value: 1.0,
            biased: false,
        };
    }

    let statistic: f64 = tally
        .counts
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();

    let dof = f64::from(BOARD_SIZE) - 1.0;
    let p_value = chi_square_sf(statistic, dof);

    UniformityResult {
        statistic,
        p_value,
        biased: p_value < SIGNIFICANCE,
    }
}

/// P(X > x) para X ~ χ² com k graus de liberdade, via Q(k/2, x/2).
fn chi_square_sf(x: f64, k: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    regularized_gamma_upper(k / 2.0, x / 2.0)
}

// ════════════════════════════════════════════════════════════════
// Função gama incompleta regularizada (série + fração contínua)
// ════════════════════════════════════════════════════════════════

const MAX_ITER: usize = 300;
const EPS: f64 = 3.0e-12;
const FPMIN: f64 = 1.0e-300;

fn regularized_gamma_upper(a: f64, x: f64) -> f64 {
    if x < a + 1.0 {
        // A série converge mais rápido nesta região
        (1.0 - gamma_series(a, x)).clamp(0.0, 1.0)
    } else {
        gamma_continued_fraction(a, x).clamp(0.0, 1.0)
    }
}

/// P(a, x) por expansão em série.
fn gamma_series(a: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let mut ap = a;
    let mut sum = 1.0 / a;
    let mut term = sum;
    for _ in 0..MAX_ITER {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * EPS {
            break;
        }
    }
    sum * (a * x.ln() - x - ln_gamma(a)).exp()
}

/// Q(a, x) por fração contínua de Lentz.
fn gamma_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / FPMIN;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITER {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = b + an / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    (a * x.ln() - x - ln_gamma(a)).exp() * h
}

/// ln Γ(x) pela aproximação de Lanczos.
fn ln_gamma(x: f64) -> f64 {
    const COEF: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];
    let mut denom = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut series = 1.000000000190015;
    for c in COEF {
        denom += 1.0;
        series += c / denom;
    }
    -tmp + (2.5066282746310005 * series / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally_with(counts: Vec<u32>, total_draws: u32) -> Tally {
        Tally {
            counts,
            total_draws,
            skipped: 0,
        }
    }

    #[test]
    fn test_uniform_tally_not_rejected() {
        // 10 sorteios: E = 1 e toda dezena saiu exatamente uma vez
        let tally = tally_with(vec![1; BOARD_SIZE as usize], 10);
        let result = chi_square_uniformity(&tally);
        assert!((result.statistic - 0.0).abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
        assert!(!result.biased);
    }

    #[test]
    fn test_skewed_tally_rejected() {
        // Toda ocorrência concentrada em seis dezenas
        let mut counts = vec![0u32; BOARD_SIZE as usize];
        for i in 0..6 {
            counts[i] = 100;
        }
        let tally = tally_with(counts, 100);
        let result = chi_square_uniformity(&tally);
        assert!(result.p_value < 1e-6, "p deveria ser mínimo: {}", result.p_value);
        assert!(result.biased);
    }

    #[test]
    fn test_empty_tally_neutral() {
        let tally = tally_with(vec![0; BOARD_SIZE as usize], 0);
        let result = chi_square_uniformity(&tally);
        assert!(!result.biased);
        assert!((result.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sf_known_critical_value() {
        // Valor crítico tabelado: P(χ²₅₉ > 77.93) ≈ 0.05
        let p = chi_square_sf(77.93, 59.0);
        assert!((p - 0.05).abs() < 0.002, "p = {}", p);
    }

    #[test]
    fn test_sf_at_mean() {
        // A mediana de χ²ₖ fica perto de k − 2/3, logo sf(k) ≈ 0.47
        let p = chi_square_sf(59.0, 59.0);
        assert!(p > 0.40 && p < 0.55, "p = {}", p);
    }

    #[test]
    fn test_sf_monotone_decreasing() {
        let mut prev = 1.0;
        for x in [1.0, 10.0, 30.0, 59.0, 80.0, 120.0, 200.0] {
            let p = chi_square_sf(x, 59.0);
            assert!(p <= prev, "sf não monótona em x={}", x);
            assert!((0.0..=1.0).contains(&p));
            prev = p;
        }
    }

    #[test]
    fn test_sf_small_dof_exact() {
        // Para k = 2, sf(x) = exp(−x/2) em forma fechada
        for x in [0.5, 1.0, 2.0, 5.0] {
            let p = chi_square_sf(x, 2.0);
            let exact = (-x / 2.0_f64).exp();
            assert!((p - exact).abs() < 1e-9, "x={}: {} vs {}", x, p, exact);
        }
    }
}
