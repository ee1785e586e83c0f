use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One synthetic movie, laid out like the public movies.csv.
#[derive(Debug, Serialize)]
struct SampleMovie {
    name: String,
    rating: String,
    genre: String,
    year: i64,
    score: f64,
    director: String,
    country: String,
    budget: Option<f64>,
    gross: Option<f64>,
    runtime: i64,
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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const GENRES: &[&str] = &[
    "Action", "Adventure", "Animation", "Biography", "Comedy", "Crime", "Drama", "Family",
    "Fantasy", "Horror", "Mystery", "Romance", "Sci-Fi", "Thriller",
];
const RATINGS: &[&str] = &["G", "PG", "PG-13", "R"];
const COUNTRIES: &[&str] = &["United States", "United Kingdom", "France", "Japan", "India"];
const DIRECTORS: &[&str] = &["A. Rivera", "B. Chen", "C. Okafor", "D. Novak", "E. Laine"];
const WORDS: &[&str] = &[
    "Midnight", "Silver", "Last", "Hidden", "River", "Empire", "Echo", "Garden", "Storm",
    "Paper", "Orbit", "Harbor",
];

fn generate(rng: &mut SimpleRng, count: usize) -> Vec<SampleMovie> {
    (0..count)
        .map(|i| {
            let year = 1980 + (rng.next_u64() % 41) as i64;
            let genre = if rng.next_f64() < 0.3 {
                format!("{}, {}", rng.pick(GENRES), rng.pick(GENRES))
            } else {
                rng.pick(GENRES).to_string()
            };
            let score = (rng.gauss(6.4, 1.0).clamp(1.0, 9.8) * 10.0).round() / 10.0;
            // Budgets grow over time; gross loosely follows budget and score.
            let budget = (rng.gauss(15.0 + (year - 1980) as f64 * 1.2, 10.0).max(0.5) * 1e6).round();
            let gross = (budget * (0.3 + rng.next_f64() * 2.5) * (score / 6.0)).round();

            // Sprinkle in the defects the cleaner has to handle.
            let (budget, gross) = match i % 50 {
                7 => (None, Some(gross)),
                19 => (Some(budget), None),
                31 => (Some(0.0), Some(gross)),
                _ => (Some(budget), Some(gross)),
            };

            SampleMovie {
                name: format!("{} {} {}", rng.pick(WORDS), rng.pick(WORDS), i + 1),
                rating: rng.pick(RATINGS).to_string(),
                genre,
                year,
                score,
                director: rng.pick(DIRECTORS).to_string(),
                country: rng.pick(COUNTRIES).to_string(),
                budget,
                gross,
                runtime: 80 + (rng.next_u64() % 80) as i64,
            }
        })
        .collect()
}

fn write_csv(movies: &[SampleMovie], path: &str) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for m in movies {
        writer.serialize(m)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(movies: &[SampleMovie], path: &str) -> anyhow::Result<()> {
    let strings = |f: fn(&SampleMovie) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(movies.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("rating", DataType::Utf8, false),
        Field::new("genre", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
        Field::new("score", DataType::Float64, false),
        Field::new("director", DataType::Utf8, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("budget", DataType::Float64, true),
        Field::new("gross", DataType::Float64, true),
        Field::new("runtime", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(|m| m.name.as_str()),
            strings(|m| m.rating.as_str()),
            strings(|m| m.genre.as_str()),
            Arc::new(Int64Array::from(movies.iter().map(|m| m.year).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(movies.iter().map(|m| m.score).collect::<Vec<_>>())),
            strings(|m| m.director.as_str()),
            strings(|m| m.country.as_str()),
            Arc::new(Float64Array::from(movies.iter().map(|m| m.budget).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(movies.iter().map(|m| m.gross).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(movies.iter().map(|m| m.runtime).collect::<Vec<_>>())),
        ],
    )?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);
    let movies = generate(&mut rng, 1000);

    write_csv(&movies, "sample_movies.csv")?;
    write_parquet(&movies, "sample_movies.parquet")?;

    println!(
        "Wrote {} movies to sample_movies.csv and sample_movies.parquet",
        movies.len()
    );
    Ok(())
}
