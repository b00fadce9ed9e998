use std::time::Duration;

use tokio::sync::mpsc;

/// Trailing-edge debounce for one report channel.
///
/// Values pushed in a burst are coalesced: only the last one is emitted, once
/// no new value arrived for `delay`. Reports are snapshots, so dropping the
/// intermediate values loses nothing but freshness. A zero delay emits
/// synchronously.
pub struct Debouncer<T> {
    inner: Inner<T>,
}

enum Inner<T> {
    Immediate(Box<dyn Fn(T) + Send>),
    Trailing(mpsc::UnboundedSender<T>),
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a tokio runtime when `delay` is non-zero.
    pub fn new<F>(delay: Duration, emit: F) -> Self
    where
        F: Fn(T) + Send + 'static,
    {
        if delay.is_zero() {
            return Self {
                inner: Inner::Immediate(Box::new(emit)),
            };
        }
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_trailing(delay, rx, emit));
        Self {
            inner: Inner::Trailing(tx),
        }
    }

    pub fn push(&self, value: T) {
        match &self.inner {
            Inner::Immediate(emit) => emit(value),
            Inner::Trailing(tx) => {
                let _ = tx.send(value);
            }
        }
    }
}

async fn run_trailing<T, F>(delay: Duration, mut rx: mpsc::UnboundedReceiver<T>, emit: F)
where
    F: Fn(T),
{
    while let Some(mut latest) = rx.recv().await {
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(value) => latest = value,
                    None => break,
                },
                () = tokio::time::sleep(delay) => break,
            }
        }
        emit(latest);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[tokio::test]
    async fn bursts_emit_only_the_last_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::from_millis(20), move |value: u32| {
            sink.lock().unwrap().push(value);
        });

        for value in 1..=3 {
            debouncer.push(value);
        }
        tokio::time::sleep(Duration::from_millis(150)).await;
        debouncer.push(4);
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(*seen.lock().unwrap(), vec![3, 4]);
    }

    #[test]
    fn zero_delay_emits_synchronously() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::ZERO, move |value: &'static str| {
            sink.lock().unwrap().push(value);
        });
        debouncer.push("a");
        debouncer.push("b");
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }
}
