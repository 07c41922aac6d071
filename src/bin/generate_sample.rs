//! Writes a synthetic diabetes dataset to `diabetes_dataset.csv`, including
//! a few duplicate and missing-value rows so the loader's cleaning pass has
//! something to do.

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Clamped, rounded normal draw for integer-valued columns.
    fn gauss_int(&mut self, mean: f64, std_dev: f64, lo: f64, hi: f64) -> i64 {
        self.gauss(mean, std_dev).clamp(lo, hi).round() as i64
    }
}

fn generate_row(rng: &mut SimpleRng) -> (Vec<String>, bool) {
    // Roughly one positive case in three, with shifted marginals per class.
    let positive = rng.next_f64() < 0.35;

    let (glucose, bmi, pregnancies, insulin) = if positive {
        (
            rng.gauss_int(142.0, 31.0, 78.0, 199.0),
            rng.gauss(35.4, 6.4).clamp(22.0, 60.0),
            rng.gauss_int(4.9, 3.7, 0.0, 17.0),
            rng.gauss_int(160.0, 100.0, 14.0, 600.0),
        )
    } else {
        (
            rng.gauss_int(110.0, 24.0, 44.0, 180.0),
            rng.gauss(30.9, 6.6).clamp(18.0, 57.0),
            rng.gauss_int(3.3, 3.0, 0.0, 13.0),
            rng.gauss_int(100.0, 70.0, 14.0, 480.0),
        )
    };

    let blood_pressure = rng.gauss_int(72.0, 18.0, 40.0, 122.0);
    let skin_thickness = rng.gauss_int(29.0, 10.0, 7.0, 63.0);
    let pedigree = rng.gauss(-1.0, 0.6).exp().clamp(0.08, 2.4);
    let age = rng.gauss_int(33.0, 12.0, 21.0, 81.0);

    let row = vec![
        pregnancies.to_string(),
        glucose.to_string(),
        blood_pressure.to_string(),
        skin_thickness.to_string(),
        insulin.to_string(),
        format!("{bmi:.1}"),
        format!("{pedigree:.3}"),
        age.to_string(),
        i64::from(positive).to_string(),
    ];
    (row, positive)
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let output_path = "diabetes_dataset.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");

    writer
        .write_record([
            "Pregnancies",
            "Glucose",
            "BloodPressure",
            "SkinThickness",
            "Insulin",
            "BMI",
            "DiabetesPedigreeFunction",
            "Age",
            "Outcome",
        ])
        .expect("Failed to write header");

    let total = 400;
    let mut positives = 0;
    let mut blanked = 0;
    let mut duplicated = 0;

    for i in 0..total {
        let (mut row, positive) = generate_row(&mut rng);
        if positive {
            positives += 1;
        }

        // Blank one Insulin cell every 40 rows to exercise dropna.
        if i % 40 == 7 {
            row[4] = String::new();
            blanked += 1;
        }

        writer.write_record(&row).expect("Failed to write row");

        // Repeat every 50th row verbatim to exercise drop_duplicates.
        if i % 50 == 11 {
            writer.write_record(&row).expect("Failed to write row");
            duplicated += 1;
        }
    }

    writer.flush().expect("Failed to flush output file");

    println!(
        "Wrote {} rows ({positives} positive) to {output_path}: \
         {blanked} with a missing value, {duplicated} duplicated",
        total + duplicated
    );
}
