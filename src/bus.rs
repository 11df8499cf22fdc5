//! A CAN bus segment a database's messages can be attached to.

#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    name: String,
    comment: Option<String>,
    baudrate: Option<u32>,
}

impl Bus {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            baudrate: None,
        }
    }

    #[must_use]
    pub fn with_baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = Some(baudrate);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn baudrate(&self) -> Option<u32> {
        self.baudrate
    }
}
