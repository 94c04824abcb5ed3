use std::collections::BTreeMap;

/// Visual channel used for time-critical notifications.
pub const HIGH_IMPORTANCE_CHANNEL: &str = "high_importance_channel";
pub const SOS_CHANNEL: &str = "sos_channel";
pub const SIREN_SOUND: &str = "siren";

/// Broadcast channels. The topic names are shared with the mobile clients,
/// which subscribe to them by exactly these strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Residents,
    Guards,
    SecurityAlerts,
}

impl Channel {
    pub fn topic(&self) -> &'static str {
        match self {
            Channel::Residents => "residents",
            Channel::Guards => "guards",
            Channel::SecurityAlerts => "security_alerts",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single device push address.
    Device(String),
    Channel(Channel),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Priority {
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Importance {
    #[default]
    Default,
    High,
    Max,
}

/// How the receiving device surfaces the notification: which category it
/// lands in, how loudly, and whether it shows on the lock screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisualChannel {
    pub category: String,
    pub importance: Importance,
    pub public: bool,
    pub sound: Option<String>,
}

impl VisualChannel {
    pub fn new(category: impl Into<String>, importance: Importance) -> Self {
        Self {
            category: category.into(),
            importance,
            public: false,
            sound: None,
        }
    }

    #[must_use]
    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    #[must_use]
    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryHints {
    pub priority: Priority,
    pub visual: Option<VisualChannel>,
}

impl DeliveryHints {
    pub fn high(visual: VisualChannel) -> Self {
        Self {
            priority: Priority::High,
            visual: Some(visual),
        }
    }
}

/// Fully formed payload handed to a [`NotificationSender`].
///
/// [`NotificationSender`]: crate::domain::sender::NotificationSender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub target: Target,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
    pub hints: DeliveryHints,
}

impl Notification {
    pub fn direct(address: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Target::Device(address.into()), title.into(), body.into())
    }

    pub fn broadcast(channel: Channel, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(Target::Channel(channel), title.into(), body.into())
    }

    fn new(target: Target, title: String, body: String) -> Self {
        Self {
            target,
            title,
            body,
            data: BTreeMap::new(),
            hints: DeliveryHints::default(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_hints(mut self, hints: DeliveryHints) -> Self {
        self.hints = hints;
        self
    }
}
