/// One collectible badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
}

/// Every badge, in challenge order.
pub const ALL_BADGES: [Badge; 18] = [
    Badge { id: "calm_creator", name: "Calm Creator" },
    Badge { id: "mood_mapper", name: "Mood Mapper" },
    Badge { id: "bounce_back", name: "Bounce Back" },
    Badge { id: "reflecto_rookie", name: "Reflecto Rookie" },
    Badge { id: "focus_finder", name: "Focus Finder" },
    Badge { id: "goal_getter", name: "Goal Getter" },
    Badge { id: "great_job", name: "Great Job" },
    Badge { id: "brave_voice", name: "Brave Voice" },
    Badge { id: "what_if_explorer", name: "What If Explorer" },
    Badge { id: "truth_spotter", name: "Truth Spotter" },
    Badge { id: "kind_heart", name: "Kind Heart" },
    Badge { id: "boost_buddy", name: "Boost Buddy" },
    Badge { id: "stay_positive", name: "Stay Positive" },
    Badge { id: "good_listener", name: "Good Listener" },
    Badge { id: "creative_spark", name: "Creative Spark" },
    Badge { id: "deep_thinker", name: "Deep Thinker" },
    Badge { id: "resilient", name: "Resilient" },
    Badge { id: "super_star", name: "Super Star" },
];

pub fn find_badge(id: &str) -> Option<&'static Badge> {
    ALL_BADGES.iter().find(|badge| badge.id == id)
}

pub fn is_known_badge(id: &str) -> bool {
    find_badge(id).is_some()
}
