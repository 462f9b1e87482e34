use byteorder::{LittleEndian, WriteBytesExt};
use clap::{Parser, ValueEnum};
use ringstage::RingBuffer;
use std::error::Error;
use tracing::{info, Level};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "staging-demo")]
#[command(about = "Stages a few batches of integers through a ring buffer")]
struct Args {
    /// Number of slots in the staging buffer
    #[arg(long, default_value_t = 1024)]
    capacity: usize,

    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

/// Serializes the live elements, oldest first, into a little-endian block.
fn stage_block(buf: &RingBuffer<i32>) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut block = Vec::with_capacity(buf.size() * 4);
    for i in 0..buf.size() {
        block.write_i32::<LittleEndian>(*buf.at(i)?)?;
    }
    Ok(block)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(Level::from(args.log_level))
        .init();

    let mut buf: RingBuffer<i32> = RingBuffer::new(args.capacity);
    let zeroed = [0i32; 10];
    let tens = vec![10i32; 2];

    let accepted = buf.push(100);
    let from_array = buf.push_slice(&zeroed);
    let from_vec = buf.push_n(tens);
    info!(accepted, from_array, from_vec, size = buf.size(), "staged");

    let popped_one = buf.pop_one();
    let popped_two = buf.pop(2);
    info!(popped_one, popped_two, size = buf.size(), remain = buf.remain(), "drained");

    match buf.at(0) {
        Ok(front) => info!(front = *front, "front element"),
        Err(err) => info!(%err, "nothing staged"),
    }

    let block = stage_block(&buf)?;
    info!(bytes = block.len(), "block ready");
    println!("{:?}", buf);
    Ok(())
}
