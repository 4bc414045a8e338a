use crate::core::events::Event;
use crate::interfaces::consumer_interface::RaceUpdate;
use flume::{Receiver, TryRecvError};

/// FeedInterface is the consumer side of the update channel. It only reads the updates and
/// never feeds anything back into the simulation.
#[derive(Debug)]
pub struct FeedInterface {
    pub rx: Receiver<RaceUpdate>,
    pub latest: Option<RaceUpdate>,
    last_seq: Option<u64>,
}

impl FeedInterface {
    pub fn new(rx: Receiver<RaceUpdate>) -> FeedInterface {
        FeedInterface {
            rx,
            latest: None,
            last_seq: None,
        }
    }

    /// update obtains the latest update in the channel (older ones are skipped, their events are
    /// still contained in the recent events of the latest update). It returns false if the
    /// simulation side hung up.
    pub fn update(&mut self) -> bool {
        loop {
            match self.rx.try_recv() {
                Ok(x) => self.latest = Some(x),
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => return false,
            }
        }
    }

    /// wait_update blocks until at least one update is available and then behaves like update.
    /// It returns false as soon as the simulation side hung up and the channel is empty.
    pub fn wait_update(&mut self) -> bool {
        match self.rx.recv() {
            Ok(x) => {
                self.latest = Some(x);
                self.update();
                true
            }
            Err(_) => false,
        }
    }

    /// take_new_events returns the events of the latest update that were not returned before,
    /// oldest first.
    pub fn take_new_events(&mut self) -> Vec<Event> {
        let latest = match &self.latest {
            Some(x) => x,
            None => return vec![],
        };

        let last_seq = self.last_seq;
        let mut new_events: Vec<Event> = latest
            .recent_events
            .iter()
            .filter(|event| last_seq.map_or(true, |seq| event.seq > seq))
            .cloned()
            .collect();
        new_events.reverse();

        if let Some(event) = new_events.last() {
            self.last_seq = Some(event.seq)
        }
        new_events
    }
}
