//! Live output through the default audio device.
//!
//! Both device sinks negotiate the same stream (mono, signed 16-bit, as close
//! to the requested rate as the device allows, within 10%) and differ only in
//! how samples travel from the render thread to the callback: the blocking
//! sink queues them like a driver write, the double-buffered sink rotates
//! them through a fixed pool of submitted slots.

use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, Stream, StreamConfig};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::sink::pool::{BufferPool, POOL_SLOTS, SLOT_SAMPLES, SampleQueue};
use crate::sink::{PcmSink, REQUESTED_SAMPLE_RATE};

/// Samples the blocking sink queues ahead of the callback, about a third of
/// a second at the requested rate.
const QUEUE_SAMPLES: usize = 8192;

/// Margin added to the playout deadline when a sink drains on drop.
const DRAIN_MARGIN: Duration = Duration::from_millis(250);

/// Pick the default output device and a stream configuration for it.
///
/// The checks run in a fixed order so the failure names the first thing the
/// device cannot do: signed 16-bit samples, then a mono channel, then a rate
/// within 10% of the requested one. A usable but inexact rate is accepted
/// with a warning; timing is derived from the actual rate afterwards.
fn negotiate() -> Result<(cpal::Device, StreamConfig, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::DeviceConfig("no default output device".into()))?;
    let ranges: Vec<_> = device
        .supported_output_configs()
        .map_err(|e| Error::DeviceConfig(format!("cannot query output formats: {e}")))?
        .collect();

    let mut format_ok = false;
    let mut best: Option<u32> = None;
    for range in ranges {
        if range.sample_format() != SampleFormat::I16 {
            continue;
        }
        format_ok = true;
        if range.channels() != 1 {
            continue;
        }
        let rate = REQUESTED_SAMPLE_RATE.clamp(range.min_sample_rate().0, range.max_sample_rate().0);
        if best.is_none_or(|b| rate.abs_diff(REQUESTED_SAMPLE_RATE) < b.abs_diff(REQUESTED_SAMPLE_RATE))
        {
            best = Some(rate);
        }
    }
    if !format_ok {
        return Err(Error::DeviceConfig(
            "device does not support signed 16-bit samples".into(),
        ));
    }
    let Some(rate) = best else {
        return Err(Error::DeviceConfig(
            "device does not support mono output".into(),
        ));
    };
    let drift = rate.abs_diff(REQUESTED_SAMPLE_RATE);
    if 10 * drift > REQUESTED_SAMPLE_RATE {
        return Err(Error::DeviceConfig(format!(
            "nearest supported rate {rate} Hz is more than 10% from {REQUESTED_SAMPLE_RATE} Hz"
        )));
    }
    if drift > 0 {
        warn!("output running at {rate} Hz, requested {REQUESTED_SAMPLE_RATE} Hz");
    }
    let config = StreamConfig {
        channels: 1,
        sample_rate: SampleRate(rate),
        buffer_size: BufferSize::Default,
    };
    Ok((device, config, rate))
}

fn open_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut fill: impl FnMut(&mut [i16]) + Send + 'static,
    on_error: impl Fn(String) + Send + 'static,
) -> Result<Stream> {
    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| fill(data),
            move |err| {
                error!("audio stream error: {err}");
                on_error(err.to_string());
            },
            None,
        )
        .map_err(|e| Error::DeviceConfig(format!("cannot open output stream: {e}")))?;
    stream
        .play()
        .map_err(|e| Error::DeviceConfig(format!("cannot start output stream: {e}")))?;
    Ok(stream)
}

fn playout_deadline(pending: usize, sample_rate: u32) -> Duration {
    let pending = pending as u64;
    Duration::from_millis(pending * 1000 / u64::from(sample_rate.max(1))) + DRAIN_MARGIN
}

/// Device sink with synchronous write semantics.
///
/// `write` returns only once every sample has been handed to the stream's
/// queue, blocking while the queue is full. Playback keeps pace with the
/// writer the way a blocking device write does.
pub struct BlockingDevice {
    // Field order is drop order: the stream stops pulling before the queue
    // goes away.
    _stream: Stream,
    queue: Arc<SampleQueue>,
    sample_rate: u32,
}

impl BlockingDevice {
    /// Open the default output device with a fixed driver-style queue.
    pub fn open() -> Result<Self> {
        let (device, config, sample_rate) = negotiate()?;
        let queue = Arc::new(SampleQueue::new(QUEUE_SAMPLES));
        let fill_queue = Arc::clone(&queue);
        let error_queue = Arc::clone(&queue);
        let stream = open_stream(
            &device,
            &config,
            move |data| fill_queue.fill(data),
            move |reason| error_queue.mark_failed(reason),
        )?;
        debug!("blocking device open at {sample_rate} Hz");
        Ok(BlockingDevice {
            _stream: stream,
            queue,
            sample_rate,
        })
    }
}

impl PcmSink for BlockingDevice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[i16]) -> Result<()> {
        self.queue.push(samples).map_err(|e| Error::DeviceIo(e.0))
    }

    /// Writes are already serialized against the device queue, so there is
    /// nothing to force out; only a stream failure can surface here. The
    /// tail drains when the sink is dropped.
    fn flush(&mut self) -> Result<()> {
        match self.queue.failure() {
            Some(reason) => Err(Error::DeviceIo(reason)),
            None => Ok(()),
        }
    }
}

impl Drop for BlockingDevice {
    fn drop(&mut self) {
        // Closing lets queued audio finish playing first.
        if !self.queue.drain(playout_deadline(self.queue.len(), self.sample_rate)) {
            warn!("closed with {} samples unplayed", self.queue.len());
        }
    }
}

/// Device sink that rotates samples through a fixed pool of whole buffers.
///
/// Full slots are submitted to the stream in order; `write` blocks only when
/// every slot is in flight, and `flush` pushes out the partial slot and waits
/// for the device to play everything.
pub struct DoubleBufferedDevice {
    _stream: Stream,
    pool: Arc<BufferPool>,
    sample_rate: u32,
}

impl DoubleBufferedDevice {
    /// Open the default output device behind the slot pool.
    pub fn open() -> Result<Self> {
        let (device, config, sample_rate) = negotiate()?;
        let pool = Arc::new(BufferPool::new(POOL_SLOTS, SLOT_SAMPLES));
        let fill_pool = Arc::clone(&pool);
        let error_pool = Arc::clone(&pool);
        let stream = open_stream(
            &device,
            &config,
            move |data| fill_pool.fill(data),
            move |reason| error_pool.mark_failed(reason),
        )?;
        debug!(
            "double-buffered device open at {sample_rate} Hz, \
             {POOL_SLOTS} slots of {SLOT_SAMPLES} samples"
        );
        Ok(DoubleBufferedDevice {
            _stream: stream,
            pool,
            sample_rate,
        })
    }
}

impl PcmSink for DoubleBufferedDevice {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn write(&mut self, samples: &[i16]) -> Result<()> {
        self.pool.push(samples).map_err(|e| Error::DeviceIo(e.0))
    }

    fn flush(&mut self) -> Result<()> {
        self.pool.flush().map_err(|e| Error::DeviceIo(e.0))
    }
}

impl Drop for DoubleBufferedDevice {
    fn drop(&mut self) {
        let pending = self.pool.pending_samples();
        if !self.pool.drain(playout_deadline(pending, self.sample_rate)) {
            warn!("closed with {} samples unplayed", self.pool.pending_samples());
        }
    }
}
