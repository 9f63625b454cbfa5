use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stagger {
    pub duration: Duration,
    pub step: Duration,
    pub max_delay: Duration,
}

impl Default for Stagger {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(400),
            step: Duration::from_millis(60),
            max_delay: Duration::from_millis(600),
        }
    }
}

impl Stagger {
    pub fn delay(&self, index: usize) -> Duration {
        let delay = self.step.saturating_mul(index.min(u32::MAX as usize) as u32);
        delay.min(self.max_delay)
    }

    pub fn declaration(&self, index: usize) -> String {
        format!(
            "animation: comment-enter {}ms ease-out {}ms both;",
            self.duration.as_millis(),
            self.delay(index).as_millis()
        )
    }
}
