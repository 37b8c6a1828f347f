//! Common test utilities and data generators.

use anofox_econometrics::Dataset;

/// Deterministic LCG producing uniforms on [-1, 1).
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 32) as f64) / (1u64 << 32) as f64 * 2.0 - 1.0
    }
}

/// Cross-section with two regressors and heteroskedastic noise:
/// `y = 1 + 2 x1 - 0.5 x2 + noise * (1 + |x1|) u`.
#[allow(dead_code)]
pub fn generate_linear_dataset(n_samples: usize, noise: f64, seed: u64) -> Dataset {
    let mut rng = Lcg::new(seed);
    let mut y = Vec::with_capacity(n_samples);
    let mut x1 = Vec::with_capacity(n_samples);
    let mut x2 = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let a = 3.0 * rng.uniform();
        let b = 2.0 * rng.uniform() + 0.5 * a;
        let u = rng.uniform();
        x1.push(a);
        x2.push(b);
        y.push(1.0 + 2.0 * a - 0.5 * b + noise * (1.0 + a.abs()) * u);
    }

    Dataset::new()
        .with_column("y", y)
        .and_then(|d| d.with_column("x1", x1))
        .and_then(|d| d.with_column("x2", x2))
        .expect("columns have equal length")
}

/// Panel of `n_firms` firms observed `per_firm` times.
///
/// Columns: `y`, `x`, `firm` (integer key), `region` (firms nested three
/// to a region), `wave` (observation index within firm, crossing firms),
/// `id` (unique per row). Each firm has its own intercept.
#[allow(dead_code)]
pub fn generate_panel_dataset(n_firms: usize, per_firm: usize, seed: u64) -> Dataset {
    let mut rng = Lcg::new(seed);
    let n = n_firms * per_firm;
    let mut y = Vec::with_capacity(n);
    let mut x = Vec::with_capacity(n);
    let mut firm = Vec::with_capacity(n);
    let mut region = Vec::with_capacity(n);
    let mut wave = Vec::with_capacity(n);
    let mut id = Vec::with_capacity(n);

    for f in 0..n_firms {
        let alpha = 5.0 * rng.uniform();
        for t in 0..per_firm {
            let xi = rng.uniform() + 0.3 * alpha;
            x.push(xi);
            y.push(alpha + 1.5 * xi + 0.4 * rng.uniform());
            firm.push(f as i64);
            region.push((f / 3) as i64);
            wave.push(t as i64);
            id.push((f * per_firm + t) as i64);
        }
    }

    Dataset::new()
        .with_column("y", y)
        .and_then(|d| d.with_column("x", x))
        .and_then(|d| d.with_column("firm", firm))
        .and_then(|d| d.with_column("region", region))
        .and_then(|d| d.with_column("wave", wave))
        .and_then(|d| d.with_column("id", id))
        .expect("columns have equal length")
}

/// Overidentified IV design: `x` is endogenous through the shared shock,
/// `z1` and `z2` are excluded instruments, `w` is an included exogenous
/// regressor. `y = 1 + 2 x + 0.5 w + e`.
#[allow(dead_code)]
pub fn generate_iv_dataset(n_samples: usize, seed: u64) -> Dataset {
    let mut rng = Lcg::new(seed);
    let mut y = Vec::with_capacity(n_samples);
    let mut x = Vec::with_capacity(n_samples);
    let mut z1 = Vec::with_capacity(n_samples);
    let mut z2 = Vec::with_capacity(n_samples);
    let mut w = Vec::with_capacity(n_samples);

    for _ in 0..n_samples {
        let a = rng.uniform();
        let b = rng.uniform();
        let c = rng.uniform();
        let shock = rng.uniform();
        let v = rng.uniform();
        let xi = 0.8 * a + 0.6 * b + 0.3 * c + 0.5 * shock + 0.2 * v;
        z1.push(a);
        z2.push(b);
        w.push(c);
        x.push(xi);
        y.push(1.0 + 2.0 * xi + 0.5 * c + shock);
    }

    Dataset::new()
        .with_column("y", y)
        .and_then(|d| d.with_column("x", x))
        .and_then(|d| d.with_column("z1", z1))
        .and_then(|d| d.with_column("z2", z2))
        .and_then(|d| d.with_column("w", w))
        .expect("columns have equal length")
}

/// Linear model on a `side × side` unit grid with coordinates `lon`, `lat`.
#[allow(dead_code)]
pub fn generate_spatial_dataset(side: usize, seed: u64) -> Dataset {
    let mut rng = Lcg::new(seed);
    let n = side * side;
    let mut y = Vec::with_capacity(n);
    let mut x = Vec::with_capacity(n);
    let mut lon = Vec::with_capacity(n);
    let mut lat = Vec::with_capacity(n);

    for i in 0..side {
        for j in 0..side {
            let xi = rng.uniform();
            lon.push(i as f64);
            lat.push(j as f64);
            x.push(xi);
            y.push(0.5 + 1.2 * xi + 0.3 * rng.uniform());
        }
    }

    Dataset::new()
        .with_column("y", y)
        .and_then(|d| d.with_column("x", x))
        .and_then(|d| d.with_column("lon", lon))
        .and_then(|d| d.with_column("lat", lat))
        .expect("columns have equal length")
}

/// Approximate equality check for floating point values.
#[allow(dead_code)]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
