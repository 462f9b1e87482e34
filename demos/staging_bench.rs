use clap::{Parser, ValueEnum};
use crossbeam::queue::ArrayQueue;
use hdrhistogram::Histogram;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use ringstage::RingBuffer;
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, Level};

#[derive(ValueEnum, Debug, Clone, PartialEq)]
enum Workload {
    Sequential,
    Random,
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Workload::Sequential => "Sequential",
            Workload::Random => "Random",
        };
        write!(f, "{}", s)
    }
}

#[derive(ValueEnum, Debug, Clone, PartialEq)]
enum Backend {
    Ring,
    ArrayQueue,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Backend::Ring => "Ring",
            Backend::ArrayQueue => "ArrayQueue",
        };
        write!(f, "{}", s)
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, value_enum, default_value_t = Workload::Sequential)]
    workload: Workload,

    #[arg(long, value_enum, default_value_t = Backend::Ring)]
    backend: Backend,

    #[arg(long, default_value_t = 5)]
    duration_seconds: u64,

    #[arg(long, default_value_t = 4096)]
    capacity: usize,

    /// Largest batch staged before draining
    #[arg(long, default_value_t = 64)]
    batch: usize,

    #[arg(long, default_value_t = false)]
    verbose: bool,
}

/// Batch sizes cycled through by the benchmark loop.
fn generate_batches(max_batch: usize, random: bool) -> Vec<usize> {
    let mut rng = thread_rng();
    let max_batch = max_batch.max(1);

    if random {
        let mut batches: Vec<usize> = (0..1024).map(|_| rng.gen_range(1..=max_batch)).collect();
        batches.shuffle(&mut rng);
        batches
    } else {
        vec![max_batch; 1024]
    }
}

trait Stage {
    fn stage(&mut self, batch: &[u64]) -> usize;
    fn drain(&mut self, n: usize) -> bool;
}

impl Stage for RingBuffer<u64> {
    fn stage(&mut self, batch: &[u64]) -> usize {
        self.push_slice(batch)
    }

    fn drain(&mut self, n: usize) -> bool {
        self.pop(n)
    }
}

impl Stage for ArrayQueue<u64> {
    fn stage(&mut self, batch: &[u64]) -> usize {
        batch.iter().take_while(|v| self.push(**v).is_ok()).count()
    }

    fn drain(&mut self, n: usize) -> bool {
        if self.len() < n {
            return false;
        }
        (0..n).all(|_| self.pop().is_some())
    }
}

fn run<S: Stage>(stage: &mut S, batches: &[usize], duration: Duration) -> Result<(usize, Duration, Histogram<u64>), Box<dyn Error>> {
    let mut hist: Histogram<u64> = Histogram::new_with_bounds(1u64, 300_000_000_000u64, 3)?;
    let max_batch = batches.iter().copied().max().unwrap_or(1);
    let payload: Vec<u64> = (0..max_batch as u64).collect();
    let mut total = Duration::ZERO;
    let mut total_elements = 0usize;
    let mut step = 0usize;

    while total < duration {
        let batch = batches[step];
        let before = Instant::now();
        let staged = stage.stage(&payload[..batch]);
        let drained = stage.drain(staged);
        let elapsed = before.elapsed();

        if !drained || staged < batch {
            debug!(batch, staged, drained, "short batch");
        }
        hist.record((elapsed.as_nanos() as u64).max(1))?; // avoid 0
        total += elapsed;
        total_elements += staged;
        step = (step + 1) % batches.len();
    }

    Ok((total_elements, total, hist))
}

fn print_result(throughput: f64, latency_min: u64, latency_percentile_50: u64,
                latency_percentile_90: u64, latency_percentile_99: u64, latency_max: u64) -> () {
    println!("\"elements_per_sec\", \"latency_min\", \"latency_percentile_50\", \"latency_percentile_90\", \"latency_percentile_99\", \"latency_max\"");
    println!("\"{}\", \"{}\", \"{}\", \"{}\", \"{}\", \"{}\"",
             throughput, latency_min, latency_percentile_50,
             latency_percentile_90, latency_percentile_99, latency_max);
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let batches = generate_batches(args.batch.min(args.capacity), args.workload == Workload::Random);
    let duration = Duration::from_secs(args.duration_seconds);
    info!(capacity = args.capacity, workload = %args.workload, backend = %args.backend, "starting");

    let (total_elements, total, hist) = match args.backend {
        Backend::Ring => {
            let mut ring: RingBuffer<u64> = RingBuffer::new(args.capacity);
            run(&mut ring, &batches, duration)?
        }
        Backend::ArrayQueue => {
            if args.capacity == 0 {
                return Err("ArrayQueue needs a non-zero capacity".into());
            }
            let mut queue: ArrayQueue<u64> = ArrayQueue::new(args.capacity);
            run(&mut queue, &batches, duration)?
        }
    };

    let throughput = total_elements as f64 / total.as_secs_f64(); // elements/s
    print_result(throughput, hist.min(), hist.value_at_quantile(0.5),
                 hist.value_at_quantile(0.9), hist.value_at_quantile(0.99), hist.max());
    Ok(())
}
