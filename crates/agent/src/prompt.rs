//! System prompt composition.
//!
//! Pure string assembly with no I/O: a fixed persona preamble, a context
//! block derived from the snapshot, an optional tools block, and the two
//! memory blocks when facts exist. The only branching is presence/absence.

use hearth_context::{ContextSnapshot, TimeInfo};

const DEFAULT_PERSONA: &str = "You are Hearth, an intelligent family life planning assistant. \
You have access to real-time context to provide more relevant and timely advice.";

/// Composes the system instruction for a turn.
#[derive(Clone)]
pub struct PromptComposer {
    persona: String,
    search_available: bool,
}

impl PromptComposer {
    pub fn new(search_available: bool) -> Self {
        Self {
            persona: DEFAULT_PERSONA.into(),
            search_available,
        }
    }

    /// Override the persona preamble.
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    /// Build the full system instruction.
    pub fn compose(
        &self,
        snapshot: &ContextSnapshot,
        stored_facts: &[String],
        relevant_facts: &[String],
    ) -> String {
        let time = &snapshot.time;
        let loc = &snapshot.location;

        let mut prompt = format!(
            "{persona}\n\n\
             CURRENT CONTEXT:\n\
             - Date: {date}\n\
             - Time: {time_str} ({tz})\n\
             - Day: {day}\n\
             - Location: {city}, {region}, {country}\n\
             - Time Context: {time_mood}\n\
             - Day Context: {day_mood}\n",
            persona = self.persona,
            date = time.current_date,
            time_str = time.current_time,
            tz = time.timezone,
            day = time.day_of_week,
            city = loc.city,
            region = loc.region,
            country = loc.country,
            time_mood = time_mood(time),
            day_mood = day_mood(time),
        );

        if self.search_available {
            prompt.push_str(
                "\nAVAILABLE TOOLS:\n\
                 - Web Search: you can search the web for current weather, local events, \
                 recipes, news, and any topic the family needs help with.\n\
                 IMPORTANT: when asked about weather, news, events, or any current \
                 information, USE THE SEARCH TOOL to get accurate, up-to-date information.\n",
            );
        }

        prompt.push_str(
            "\nUSE THIS CONTEXT TO:\n\
             1. Provide time-relevant suggestions (morning routines, evening activities, weekend plans)\n\
             2. Consider the day of the week for scheduling (weekday vs weekend activities)\n\
             3. Offer location-appropriate recommendations when possible\n\
             4. Reference the current date and time naturally in your responses\n\
             5. Suggest activities that make sense for the current time of day\n\n\
             Always be helpful, family-focused, and use the context to provide more \
             personalized and timely advice.",
        );

        if !stored_facts.is_empty() {
            prompt.push_str("\n\nSTORED FAMILY INFORMATION:\n");
            for fact in stored_facts {
                prompt.push_str(&format!("• {fact}\n"));
            }
            prompt.push_str("IMPORTANT: Use this information to personalize your responses.");
        }

        if !relevant_facts.is_empty() {
            prompt.push_str("\n\nRELEVANT CONTEXT FOR THIS QUERY:\n");
            for fact in relevant_facts {
                prompt.push_str(&format!("• {fact}\n"));
            }
        }

        prompt
    }
}

fn time_mood(time: &TimeInfo) -> &'static str {
    if time.is_morning {
        "It's morning - perfect for planning the day ahead!"
    } else if time.is_afternoon {
        "It's afternoon - great time to check on daily progress!"
    } else if time.is_evening {
        "It's evening - ideal for family dinner planning and evening activities!"
    } else {
        "It's late - time to wind down and plan for tomorrow!"
    }
}

fn day_mood(time: &TimeInfo) -> &'static str {
    if time.is_weekend {
        "It's the weekend - perfect for family activities and relaxation!"
    } else {
        "It's a weekday - time for school, work, and structured activities!"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hearth_context::{LocationInfo, time_info_at};

    fn snapshot_at(hour: u32) -> ContextSnapshot {
        ContextSnapshot {
            // 2026-08-24 is a Monday
            time: time_info_at(Utc.with_ymd_and_hms(2026, 8, 24, hour, 30, 0).unwrap()),
            location: LocationInfo::unknown(),
        }
    }

    #[test]
    fn context_block_always_present() {
        let prompt = PromptComposer::new(false).compose(&snapshot_at(10), &[], &[]);
        assert!(prompt.contains("CURRENT CONTEXT:"));
        assert!(prompt.contains("Monday, August 24, 2026"));
        assert!(prompt.contains("Unknown, Unknown, Unknown"));
    }

    #[test]
    fn no_memory_blocks_without_facts() {
        let prompt = PromptComposer::new(false).compose(&snapshot_at(10), &[], &[]);
        assert!(!prompt.contains("STORED FAMILY INFORMATION"));
        assert!(!prompt.contains("RELEVANT CONTEXT FOR THIS QUERY"));
    }

    #[test]
    fn stored_facts_block() {
        let facts = vec!["likes hiking".to_string(), "has two kids".to_string()];
        let prompt = PromptComposer::new(false).compose(&snapshot_at(10), &facts, &[]);
        assert!(prompt.contains("STORED FAMILY INFORMATION:"));
        assert!(prompt.contains("• likes hiking"));
        assert!(prompt.contains("• has two kids"));
        assert!(!prompt.contains("RELEVANT CONTEXT FOR THIS QUERY"));
    }

    #[test]
    fn relevant_facts_block() {
        let stored = vec!["likes hiking".to_string()];
        let relevant = vec!["hiking boots size 42".to_string()];
        let prompt = PromptComposer::new(false).compose(&snapshot_at(10), &stored, &relevant);
        assert!(prompt.contains("RELEVANT CONTEXT FOR THIS QUERY:"));
        assert!(prompt.contains("• hiking boots size 42"));
    }

    #[test]
    fn tools_block_only_when_search_available() {
        let with = PromptComposer::new(true).compose(&snapshot_at(10), &[], &[]);
        let without = PromptComposer::new(false).compose(&snapshot_at(10), &[], &[]);
        assert!(with.contains("AVAILABLE TOOLS:"));
        assert!(!without.contains("AVAILABLE TOOLS:"));
    }

    #[test]
    fn time_moods_follow_buckets() {
        assert!(PromptComposer::new(false)
            .compose(&snapshot_at(8), &[], &[])
            .contains("It's morning"));
        assert!(PromptComposer::new(false)
            .compose(&snapshot_at(14), &[], &[])
            .contains("It's afternoon"));
        assert!(PromptComposer::new(false)
            .compose(&snapshot_at(18), &[], &[])
            .contains("It's evening"));
        assert!(PromptComposer::new(false)
            .compose(&snapshot_at(23), &[], &[])
            .contains("It's late"));
    }

    #[test]
    fn composition_is_deterministic() {
        let snap = snapshot_at(10);
        let facts = vec!["fact".to_string()];
        let a = PromptComposer::new(true).compose(&snap, &facts, &facts);
        let b = PromptComposer::new(true).compose(&snap, &facts, &facts);
        assert_eq!(a, b);
    }

    #[test]
    fn custom_persona() {
        let prompt = PromptComposer::new(false)
            .with_persona("You are a terse scheduling bot.")
            .compose(&snapshot_at(10), &[], &[]);
        assert!(prompt.starts_with("You are a terse scheduling bot."));
    }
}
