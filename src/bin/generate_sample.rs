//! Writes a synthetic formation-cycle file in the instrument export format:
//! tab separated, `,` as decimal separator, one header line.

use csv::WriterBuilder;

const CURRENT_MA: f64 = 0.35;
const CAPACITY_MAH: f64 = 1.2;
const STEP_S: f64 = 30.0;
const REST_S: f64 = 600.0;

/// Deterministic noise source: 64-bit LCG (Knuth MMIX constants).
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Roughly normal sample: sum of four uniforms, rescaled to unit variance.
    fn jitter(&mut self, std_dev: f64) -> f64 {
        let sum: f64 = (0..4).map(|_| self.uniform()).sum();
        (sum - 2.0) * 3f64.sqrt() * std_dev
    }
}

/// Open-circuit-like potential for a state of charge in `[0, 1]`.
fn potential(soc: f64) -> f64 {
    0.05 + 1.45 * soc.powf(0.6) - 0.1 * (1.0 - soc).powi(8)
}

/// Comma-decimal rendering used by the cycler software.
fn decimal(value: f64, digits: usize) -> String {
    format!("{value:.digits$}").replace('.', ",")
}

struct Row {
    cycle: u32,
    time_s: f64,
    potential_v: f64,
    capacity_mah: f64,
    current_ma: f64,
}

fn main() {
    let cycles: u32 = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(3);
    let output_path = "sample_formation.txt";

    let mut noise = Noise(42);
    let mut rows = Vec::new();
    let mut time_s = 0.0;

    // Open-circuit rest before the first lithiation.
    while time_s < REST_S {
        rows.push(Row {
            cycle: 0,
            time_s,
            potential_v: 2.9 + noise.jitter(0.002),
            capacity_mah: 0.0,
            current_ma: noise.jitter(1e-8),
        });
        time_s += STEP_S;
    }

    let steps = (CAPACITY_MAH / CURRENT_MA * 3600.0 / STEP_S) as usize;
    for cycle in 1..=cycles {
        // First-cycle irreversible loss shortens later charges.
        let fade = if cycle == 1 { 0.82 } else { 0.97 };

        for (sign, span) in [(-1.0, 1.0), (1.0, fade)] {
            let n = (steps as f64 * span) as usize;
            for i in 0..n {
                let progress = i as f64 / steps as f64;
                let soc = if sign < 0.0 { 1.0 - progress } else { progress + (1.0 - span) };
                let polarization = sign * 0.03;
                rows.push(Row {
                    cycle,
                    time_s,
                    potential_v: potential(soc) + polarization + noise.jitter(0.001),
                    capacity_mah: CURRENT_MA * i as f64 * STEP_S / 3600.0,
                    current_ma: sign * CURRENT_MA + noise.jitter(1e-4),
                });
                time_s += STEP_S;
            }
        }
    }

    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output_path)
        .expect("Failed to create output file");
    writer
        .write_record([
            "Cycle Number",
            "Time (s)",
            "Potential (V)",
            "Capacity (mAh)",
            "Current (mA)",
        ])
        .expect("Failed to write header");

    for row in &rows {
        writer
            .write_record([
                row.cycle.to_string(),
                decimal(row.time_s, 1),
                decimal(row.potential_v, 5),
                decimal(row.capacity_mah, 6),
                decimal(row.current_ma, 6),
            ])
            .expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush output");

    println!("Wrote {} rows ({cycles} cycles) to {output_path}", rows.len());
}
