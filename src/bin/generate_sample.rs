use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

/// ADC sample period in seconds (500 Hz).
const SAMPLE_PERIOD: f64 = 0.002;
/// Mid-scale of a 12-bit ADC.
const BASELINE: f64 = 2048.0;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// One heartbeat's P-QRS-T shape, `phase` in seconds since the beat started.
fn heartbeat(phase: f64) -> f64 {
    let waves = [
        (0.10, 0.025, 60.0),   // P
        (0.19, 0.008, -80.0),  // Q
        (0.21, 0.010, 700.0),  // R
        (0.23, 0.009, -150.0), // S
        (0.45, 0.040, 180.0),  // T
    ];
    waves
        .iter()
        .map(|&(mu, sigma, amp)| gaussian(phase, mu, sigma, amp))
        .sum()
}

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
}

/// Raw ADC counts: beats at 72 bpm, mains hum, and white noise.
fn generate_ecg(n: usize, rng: &mut SimpleRng) -> Vec<i64> {
    let beat_period = 60.0 / 72.0;
    (0..n)
        .map(|i| {
            let t = i as f64 * SAMPLE_PERIOD;
            let hum = 25.0 * (2.0 * std::f64::consts::PI * 60.0 * t).sin();
            let v = BASELINE + heartbeat(t % beat_period) + hum + rng.gauss(0.0, 8.0);
            v.round().clamp(0.0, 4095.0) as i64
        })
        .collect()
}

/// Running average over `window` samples, integer counts.
fn smooth(samples: &[i64], window: usize) -> Vec<i64> {
    let mut sum = 0i64;
    samples
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            sum += v;
            if i >= window {
                sum -= samples[i - window];
            }
            sum / (i + 1).min(window) as i64
        })
        .collect()
}

/// Five-point derivative `(-x[n-4] - 2x[n-3] + 2x[n-1] + x[n]) / 8`.
fn derivative(samples: &[i64]) -> Vec<i64> {
    (0..samples.len())
        .map(|i| {
            let at = |k: usize| if i >= k { samples[i - k] } else { samples[0] };
            (-at(4) - 2 * at(3) + 2 * at(1) + at(0)) >> 3
        })
        .collect()
}

fn write_raw(path: &str, samples: &[i64]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path).with_context(|| format!("creating {path}"))?);
    for line in samples.chunks(8) {
        let text: Vec<String> = line.iter().map(i64::to_string).collect();
        writeln!(out, "{}", text.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

fn write_dump(path: &str, columns: &[(&str, &[i64])]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(columns.iter().map(|(name, _)| *name))?;
    let n = columns.first().map_or(0, |(_, v)| v.len());
    for i in 0..n {
        writer.write_record(columns.iter().map(|(_, v)| v[i].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let n = 2500; // five seconds

    let sample = generate_ecg(n, &mut rng);
    let filtered = smooth(&sample, 8);
    let deriv = derivative(&filtered);
    let dual_qrs: Vec<i64> = deriv.iter().map(|&d| i64::from(d.abs() > 20)).collect();

    let raw_path = "sample_ekg.txt";
    write_raw(raw_path, &sample)?;

    let dump_path = "run.out";
    write_dump(
        dump_path,
        &[
            ("Sample", sample.as_slice()),
            ("Filtered", filtered.as_slice()),
            ("Deriv_2", deriv.as_slice()),
            ("Dual_QRS", dual_qrs.as_slice()),
        ],
    )?;

    println!("Wrote {n} raw samples to {raw_path} and a 4-signal dump to {dump_path}");
    println!("Try: sigdump plot {dump_path} --spacing 0.002 -s Sample::-2000 -s Filtered::-2000 -s Dual_QRS:1000");
    Ok(())
}
