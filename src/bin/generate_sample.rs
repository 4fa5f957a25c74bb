//! Writes a synthetic employee survey CSV for trying out the dashboard.
//!
//! ```text
//! generate_sample [--encoding cp949|utf-8-sig|utf-8] [--rows N] [OUTPUT]
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use encoding_rs::EUC_KR;

#[derive(Parser, Debug)]
#[command(about = "Generate a synthetic HR survey CSV")]
struct Args {
    /// Output encoding: cp949, utf-8-sig or utf-8.
    #[arg(long, default_value = "cp949")]
    encoding: String,

    /// Number of employees.
    #[arg(long, default_value_t = 1470)]
    rows: usize,

    /// Output file.
    #[arg(default_value = "HR Data.csv")]
    output: PathBuf,
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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_f64() * items.len() as f64) as usize % items.len()]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const DEPARTMENTS: [(&str, f64); 3] = [("영업부", -0.3), ("연구개발부", 0.2), ("인사부", 0.0)];
const RANKS: [(&str, f64); 4] = [
    ("사원", 2_600_000.0),
    ("대리", 3_300_000.0),
    ("과장", 4_200_000.0),
    ("부장", 5_600_000.0),
];
const OVERTIME: [(&str, f64); 4] = [("없음", 0.4), ("적음", 0.2), ("보통", -0.1), ("많음", -0.6)];

fn with_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn score(value: f64) -> u8 {
    value.round().clamp(1.0, 4.0) as u8
}

fn build_csv(rows: usize, rng: &mut SimpleRng) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["부서", "직급", "야근정도", "업무만족도", "업무환경만족도", "월급여"])?;

    for _ in 0..rows {
        let (dept, dept_bias) = *rng.pick(&DEPARTMENTS);
        let (rank, base_salary) = *rng.pick(&RANKS);
        let (overtime, overtime_bias) = *rng.pick(&OVERTIME);

        let environment = score(rng.gauss(2.7, 0.9));
        let satisfaction = 0.6 * environment as f64 + 1.0 + dept_bias + overtime_bias;
        // a few unanswered questions
        let satisfaction = if rng.next_f64() < 0.02 {
            "N/A".to_owned()
        } else {
            score(rng.gauss(satisfaction, 0.6)).to_string()
        };
        let salary = (rng.gauss(base_salary, base_salary * 0.08) / 10_000.0).round() as u64 * 10_000;

        writer.write_record([
            dept,
            rank,
            overtime,
            satisfaction.as_str(),
            environment.to_string().as_str(),
            format!("{}원", with_thousands(salary)).as_str(),
        ])?;
    }

    let bytes = writer.into_inner().context("flushing CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn encode(text: &str, encoding: &str) -> Result<Vec<u8>> {
    match encoding {
        "cp949" => {
            let (bytes, _, had_errors) = EUC_KR.encode(text);
            if had_errors {
                bail!("text is not representable in cp949");
            }
            Ok(bytes.into_owned())
        }
        "utf-8-sig" => {
            let mut bytes = b"\xEF\xBB\xBF".to_vec();
            bytes.extend_from_slice(text.as_bytes());
            Ok(bytes)
        }
        "utf-8" => Ok(text.as_bytes().to_vec()),
        other => bail!("unsupported encoding: {other}"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(42);

    let text = build_csv(args.rows, &mut rng)?;
    let bytes = encode(&text, &args.encoding)?;
    std::fs::write(&args.output, bytes)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Wrote {} employees to {} ({})",
        args.rows,
        args.output.display(),
        args.encoding
    );
    Ok(())
}
