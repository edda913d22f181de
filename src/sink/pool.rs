//! Transfer primitives between the synchronous render thread and the audio
//! callback.
//!
//! Both primitives bridge the same gap with different disciplines: the
//! sequencer pushes samples from its own thread, the device callback pulls
//! them at the hardware rate. [`SampleQueue`] behaves like a driver's fixed
//! playback queue: writers block while it is full. [`BufferPool`] holds a
//! small fixed set of slots that are handed to the device whole and reused
//! once played out. Neither allocates after construction, so memory stays
//! bounded no matter how long the render runs.
//!
//! Blocked producers wake on a condition variable; the wait is re-armed on a
//! short timeout so a stalled callback cannot strand them past the failure
//! check.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Upper bound on one producer wait between completion checks.
const COMPLETION_POLL: Duration = Duration::from_millis(100);

/// Slots a [`BufferPool`] rotates through.
pub(crate) const POOL_SLOTS: usize = 4;

/// Samples per pool slot.
pub(crate) const SLOT_SAMPLES: usize = 4096;

/// The stream's error callback reported a failure; the session is dead.
#[derive(Debug)]
pub(crate) struct StreamFailed(pub String);

struct QueueState {
    buf: VecDeque<i16>,
    capacity: usize,
    failure: Option<String>,
}

/// Fixed-capacity FIFO of samples with blocking producer semantics.
///
/// `push` accepts the whole slice, sleeping whenever the queue is full, the
/// way a blocking device write sleeps on the driver's playback queue. The
/// consumer side never blocks: `fill` hands over whatever is queued and pads
/// the rest of the callback's buffer with silence.
pub(crate) struct SampleQueue {
    state: Mutex<QueueState>,
    room: Condvar,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> Self {
        SampleQueue {
            state: Mutex::new(QueueState {
                buf: VecDeque::with_capacity(capacity),
                capacity,
                failure: None,
            }),
            room: Condvar::new(),
        }
    }

    /// Append `samples`, blocking while the queue is full. Fails once the
    /// stream has reported an error, including mid-wait.
    pub fn push(&self, samples: &[i16]) -> Result<(), StreamFailed> {
        let mut state = self.state.lock().unwrap();
        let mut offset = 0;
        while offset < samples.len() {
            if let Some(msg) = &state.failure {
                return Err(StreamFailed(msg.clone()));
            }
            let free = state.capacity - state.buf.len();
            if free == 0 {
                let (guard, _) = self.room.wait_timeout(state, COMPLETION_POLL).unwrap();
                state = guard;
                continue;
            }
            let n = free.min(samples.len() - offset);
            state.buf.extend(samples[offset..offset + n].iter().copied());
            offset += n;
        }
        Ok(())
    }

    /// Move queued samples into `out`, padding the tail with silence.
    pub fn fill(&self, out: &mut [i16]) {
        let mut state = self.state.lock().unwrap();
        let n = state.buf.len().min(out.len());
        for (slot, sample) in out[..n].iter_mut().zip(state.buf.drain(..n)) {
            *slot = sample;
        }
        out[n..].fill(0);
        drop(state);
        self.room.notify_all();
    }

    /// Wait until the queue empties or `timeout` passes. Returns whether it
    /// emptied.
    pub fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        while !state.buf.is_empty() && state.failure.is_none() {
            let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, _) = self
                .room
                .wait_timeout(state, left.min(COMPLETION_POLL))
                .unwrap();
            state = guard;
        }
        state.buf.is_empty()
    }

    /// Record a stream failure and wake every blocked producer.
    pub fn mark_failed(&self, reason: String) {
        let mut state = self.state.lock().unwrap();
        if state.failure.is_none() {
            state.failure = Some(reason);
        }
        drop(state);
        self.room.notify_all();
    }

    /// The failure recorded by the stream, if any.
    pub fn failure(&self) -> Option<String> {
        self.state.lock().unwrap().failure.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().buf.len()
    }
}

struct Slot {
    samples: Box<[i16]>,
    /// Fill level while the producer owns the slot, submitted length while it
    /// is in flight.
    len: usize,
    consumed: usize,
    in_flight: bool,
}

impl Slot {
    fn new(capacity: usize) -> Self {
        Slot {
            samples: vec![0; capacity].into_boxed_slice(),
            len: 0,
            consumed: 0,
            in_flight: false,
        }
    }
}

struct PoolState {
    slots: Vec<Slot>,
    /// Indices of in-flight slots, oldest first.
    submitted: VecDeque<usize>,
    /// Slot the producer is currently filling.
    current: usize,
    failure: Option<String>,
}

impl PoolState {
    fn submit_current(&mut self) {
        let cur = self.current;
        let slot = &mut self.slots[cur];
        slot.in_flight = true;
        slot.consumed = 0;
        self.submitted.push_back(cur);
        self.current = (cur + 1) % self.slots.len();
    }
}

/// Fixed set of reusable sample buffers submitted to the device whole.
///
/// The producer fills the current slot and submits it once full; when every
/// slot is in flight it waits for the oldest to complete. Slots complete
/// strictly in submission order because the consumer drains them FIFO, so
/// playback order always matches write order.
pub(crate) struct BufferPool {
    state: Mutex<PoolState>,
    completed: Condvar,
}

impl BufferPool {
    pub fn new(count: usize, capacity: usize) -> Self {
        BufferPool {
            state: Mutex::new(PoolState {
                slots: (0..count).map(|_| Slot::new(capacity)).collect(),
                submitted: VecDeque::with_capacity(count),
                current: 0,
                failure: None,
            }),
            completed: Condvar::new(),
        }
    }

    /// Copy `samples` into the pool, submitting slots as they fill and
    /// waiting for completions when none is free.
    pub fn push(&self, samples: &[i16]) -> Result<(), StreamFailed> {
        let mut state = self.state.lock().unwrap();
        let mut offset = 0;
        while offset < samples.len() {
            if let Some(msg) = &state.failure {
                return Err(StreamFailed(msg.clone()));
            }
            if state.slots[state.current].in_flight {
                let (guard, _) = self.completed.wait_timeout(state, COMPLETION_POLL).unwrap();
                state = guard;
                continue;
            }
            let cur = state.current;
            let slot = &mut state.slots[cur];
            let n = (slot.samples.len() - slot.len).min(samples.len() - offset);
            slot.samples[slot.len..slot.len + n].copy_from_slice(&samples[offset..offset + n]);
            slot.len += n;
            offset += n;
            if slot.len == slot.samples.len() {
                state.submit_current();
            }
        }
        Ok(())
    }

    /// Submit the partial current slot, then block until every in-flight
    /// slot has been played out.
    pub fn flush(&self) -> Result<(), StreamFailed> {
        let mut state = self.state.lock().unwrap();
        if !state.slots[state.current].in_flight && state.slots[state.current].len > 0 {
            state.submit_current();
        }
        while state.failure.is_none() && !state.submitted.is_empty() {
            let (guard, _) = self.completed.wait_timeout(state, COMPLETION_POLL).unwrap();
            state = guard;
        }
        match &state.failure {
            Some(msg) => Err(StreamFailed(msg.clone())),
            None => Ok(()),
        }
    }

    /// Like [`flush`](Self::flush) but gives up after `timeout`. Returns
    /// whether the pool drained.
    pub fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        if !state.slots[state.current].in_flight && state.slots[state.current].len > 0 {
            state.submit_current();
        }
        while state.failure.is_none() && !state.submitted.is_empty() {
            let Some(left) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            let (guard, _) = self
                .completed
                .wait_timeout(state, left.min(COMPLETION_POLL))
                .unwrap();
            state = guard;
        }
        state.submitted.is_empty()
    }

    /// Move in-flight samples into `out`, padding the tail with silence.
    /// Completed slots return to the producer in submission order.
    pub fn fill(&self, out: &mut [i16]) {
        let mut state = self.state.lock().unwrap();
        let mut filled = 0;
        while filled < out.len() {
            let Some(&idx) = state.submitted.front() else {
                break;
            };
            let slot = &mut state.slots[idx];
            let n = (slot.len - slot.consumed).min(out.len() - filled);
            out[filled..filled + n].copy_from_slice(&slot.samples[slot.consumed..slot.consumed + n]);
            slot.consumed += n;
            filled += n;
            if slot.consumed == slot.len {
                slot.len = 0;
                slot.consumed = 0;
                slot.in_flight = false;
                state.submitted.pop_front();
            }
        }
        out[filled..].fill(0);
        drop(state);
        self.completed.notify_all();
    }

    /// Record a stream failure and wake every blocked producer.
    pub fn mark_failed(&self, reason: String) {
        let mut state = self.state.lock().unwrap();
        if state.failure.is_none() {
            state.failure = Some(reason);
        }
        drop(state);
        self.completed.notify_all();
    }

    /// Samples accepted but not yet played out, staged or in flight.
    pub fn pending_samples(&self) -> usize {
        let state = self.state.lock().unwrap();
        let in_flight: usize = state
            .submitted
            .iter()
            .map(|&i| state.slots[i].len - state.slots[i].consumed)
            .sum();
        let cur = &state.slots[state.current];
        let staged = if cur.in_flight { 0 } else { cur.len };
        in_flight + staged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    #[test]
    fn test_queue_passes_samples_in_order() {
        let q = Arc::new(SampleQueue::new(8));
        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || {
                let data: Vec<i16> = (1..=20).collect();
                q.push(&data).unwrap();
            })
        };
        let mut got = Vec::new();
        let mut out = [0i16; 4];
        for _ in 0..1000 {
            if got.len() >= 20 {
                break;
            }
            q.fill(&mut out);
            got.extend(out.iter().copied().filter(|&s| s != 0));
            thread::sleep(Duration::from_millis(1));
        }
        producer.join().unwrap();
        let expected: Vec<i16> = (1..=20).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_queue_fill_pads_with_silence() {
        let q = SampleQueue::new(8);
        q.push(&[7, 8]).unwrap();
        let mut out = [1i16; 5];
        q.fill(&mut out);
        assert_eq!(out, [7, 8, 0, 0, 0]);
    }

    #[test]
    fn test_queue_push_blocks_while_full() {
        let q = Arc::new(SampleQueue::new(4));
        q.push(&[1, 2, 3, 4]).unwrap();
        let done = Arc::new(AtomicBool::new(false));
        let writer = {
            let q = Arc::clone(&q);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                q.push(&[5, 6]).unwrap();
                done.store(true, Ordering::SeqCst);
            })
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!done.load(Ordering::SeqCst), "push returned while full");
        let mut out = [0i16; 2];
        q.fill(&mut out);
        assert_eq!(out, [1, 2]);
        writer.join().unwrap();
        assert!(done.load(Ordering::SeqCst));
        assert_eq!(q.len(), 4);
    }

    #[test]
    fn test_queue_push_fails_after_stream_error() {
        let q = Arc::new(SampleQueue::new(2));
        q.push(&[1, 2]).unwrap();
        let writer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.push(&[3]))
        };
        thread::sleep(Duration::from_millis(30));
        q.mark_failed("device unplugged".into());
        let err = writer.join().unwrap().unwrap_err();
        assert!(err.0.contains("unplugged"));
        assert_eq!(q.failure().as_deref(), Some("device unplugged"));
    }

    #[test]
    fn test_queue_drain_reports_timeout() {
        let q = SampleQueue::new(8);
        q.push(&[1, 2]).unwrap();
        assert!(!q.drain(Duration::from_millis(20)));
        let mut out = [0i16; 2];
        q.fill(&mut out);
        assert!(q.drain(Duration::from_millis(20)));
    }

    #[test]
    fn test_pool_submits_full_slots_in_order() {
        let p = BufferPool::new(2, 4);
        p.push(&[1, 2, 3, 4]).unwrap();
        p.push(&[5, 6]).unwrap();
        assert_eq!(p.pending_samples(), 6);
        let mut out = [0i16; 4];
        p.fill(&mut out);
        assert_eq!(out, [1, 2, 3, 4]);
        // The partial slot stays with the producer until full or flushed.
        p.fill(&mut out);
        assert_eq!(out, [0, 0, 0, 0]);
        assert_eq!(p.pending_samples(), 2);
    }

    #[test]
    fn test_pool_flush_submits_partial_and_waits() {
        let p = Arc::new(BufferPool::new(2, 4));
        p.push(&[1, 2]).unwrap();
        let flusher = {
            let p = Arc::clone(&p);
            thread::spawn(move || p.flush())
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!flusher.is_finished(), "flush returned before playout");
        let mut out = [0i16; 4];
        p.fill(&mut out);
        assert_eq!(out, [1, 2, 0, 0]);
        flusher.join().unwrap().unwrap();
        assert_eq!(p.pending_samples(), 0);
    }

    #[test]
    fn test_pool_push_blocks_while_all_slots_in_flight() {
        let p = Arc::new(BufferPool::new(2, 2));
        p.push(&[1, 2, 3, 4]).unwrap();
        let writer = {
            let p = Arc::clone(&p);
            thread::spawn(move || p.push(&[5, 6]).unwrap())
        };
        thread::sleep(Duration::from_millis(50));
        assert!(!writer.is_finished(), "push returned with no free slot");
        let mut out = [0i16; 2];
        p.fill(&mut out);
        assert_eq!(out, [1, 2]);
        writer.join().unwrap();
        p.fill(&mut out);
        assert_eq!(out, [3, 4]);
        p.fill(&mut out);
        assert_eq!(out, [5, 6]);
    }

    #[test]
    fn test_pool_memory_stays_bounded() {
        let p = Arc::new(BufferPool::new(2, 4));
        let stop = Arc::new(AtomicBool::new(false));
        let consumer = {
            let p = Arc::clone(&p);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut seen = Vec::new();
                let mut out = [0i16; 3];
                while !stop.load(Ordering::SeqCst) {
                    assert!(p.pending_samples() <= 8);
                    p.fill(&mut out);
                    seen.extend(out.iter().copied().filter(|&s| s != 0));
                    thread::sleep(Duration::from_millis(1));
                }
                seen
            })
        };
        let data: Vec<i16> = (1..=50).collect();
        p.push(&data).unwrap();
        p.flush().unwrap();
        stop.store(true, Ordering::SeqCst);
        let seen = consumer.join().unwrap();
        assert_eq!(seen, data);
    }

    #[test]
    fn test_pool_push_fails_after_stream_error() {
        let p = Arc::new(BufferPool::new(1, 2));
        p.push(&[1, 2]).unwrap();
        let writer = {
            let p = Arc::clone(&p);
            thread::spawn(move || p.push(&[3]))
        };
        thread::sleep(Duration::from_millis(30));
        p.mark_failed("stream closed".into());
        let err = writer.join().unwrap().unwrap_err();
        assert!(err.0.contains("closed"));
        assert!(p.flush().is_err());
    }
}
