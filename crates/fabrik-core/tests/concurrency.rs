//! Concurrency tests: many threads hammering one pool and one queue.
//!
//! These pin the linearizability claims: per-pool conservation under
//! parallel consume/produce, and queue size consistency under parallel
//! push/pop.

use std::sync::Arc;
use std::thread;

use fabrik_core::event::Priority;
use fabrik_core::resource::Status;
use fabrik_core::test_utils::{pool, queue, report};

#[test]
fn pool_conserves_units_under_parallel_hammering() {
    const THREADS: usize = 8;
    const OPS_PER_THREAD: usize = 2_000;

    let subject = pool("contended", 25, 50);
    let capacity = subject.max_capacity();

    let mut handles = Vec::with_capacity(THREADS);
    for worker in 0..THREADS {
        let subject = Arc::clone(&subject);
        handles.push(thread::spawn(move || {
            let mut consumed: u64 = 0;
            let mut absorbed: u64 = 0;
            for op in 0..OPS_PER_THREAD {
                // Cheap deterministic mix of quantities and directions.
                let quantity = ((worker + op) % 3 + 1) as u32;
                if (worker + op) % 2 == 0 {
                    if subject.consume(quantity) == Status::Ok {
                        consumed += u64::from(quantity);
                    }
                } else {
                    absorbed += u64::from(subject.produce(quantity).absorbed);
                }
                assert!(subject.level() <= capacity);
            }
            (consumed, absorbed)
        }));
    }

    let mut consumed_total: u64 = 0;
    let mut absorbed_total: u64 = 0;
    for handle in handles {
        let (consumed, absorbed) = handle.join().expect("hammer thread");
        consumed_total += consumed;
        absorbed_total += absorbed;
    }

    let final_level = u64::from(subject.level());
    assert!(final_level <= u64::from(capacity));
    assert_eq!(25 + absorbed_total - consumed_total, final_level);
}

#[test]
fn queue_size_is_consistent_under_parallel_push_and_pop() {
    const PRODUCERS: usize = 4;
    const EVENTS_PER_PRODUCER: usize = 1_000;
    const TOTAL: usize = PRODUCERS * EVENTS_PER_PRODUCER;

    let mailbox = queue();

    let consumer = {
        let mailbox = Arc::clone(&mailbox);
        thread::spawn(move || {
            let mut received = 0usize;
            let mut high = 0usize;
            while received < TOTAL {
                match mailbox.pop() {
                    Some(event) => {
                        received += 1;
                        if event.priority == Priority::High {
                            high += 1;
                        }
                    }
                    None => thread::yield_now(),
                }
            }
            high
        })
    };

    let mut producers = Vec::with_capacity(PRODUCERS);
    for worker in 0..PRODUCERS {
        let mailbox = Arc::clone(&mailbox);
        producers.push(thread::spawn(move || {
            for i in 0..EVENTS_PER_PRODUCER {
                let priority = if i % 2 == 0 { Priority::High } else { Priority::Low };
                mailbox.push(report(priority, (worker * EVENTS_PER_PRODUCER + i) as u32));
            }
        }));
    }

    for producer in producers {
        producer.join().expect("producer thread");
    }
    let high_seen = consumer.join().expect("consumer thread");

    // Every pushed event was popped exactly once; nothing lingers.
    assert_eq!(high_seen, TOTAL / 2);
    assert_eq!(mailbox.len(), 0);
    assert_eq!(mailbox.pop(), None);
}
