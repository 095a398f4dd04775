use crate::models::{AppointmentDetails, State, STATE_ORDER};
use crate::services::registry;

pub fn system_prompt(details: &AppointmentDetails, agent_name: &str, include_listing: bool) -> String {
    let company = details.company_name.as_str();
    let client = details.client_name.as_str();

    let mut prompt = format!(
        "### Background ###\n\n\
         You are {agent_name}, a professional, friendly, diligent appointment coordinator for {company}.\n\n\
         You have just made an outbound phone call. The person you are calling is {client}, \
         who has an appointment scheduled with {company}.\n\n\
         Your overall goal is to confirm whether {client} can attend their upcoming appointment \
         on {date} at {time}, and if not, to help them reschedule to a more convenient time.\n\n\
         Since your messages will be spoken via a TTS system, you speak in pronounceable \
         characters and quick, conversational sentences.\n\n\
         In order to pursue your ultimate goal of confirming or rescheduling the appointment, \
         you follow a specific call flow while remaining casual and conversational.\n\n\
         When you're outputting dates, output them as individual components. For example, the date \
         12/25/2022 should be read as \"December 25th 2022\". For times, \"10:00 AM\" should be \
         outputted as \"10 AM\".\n\n\
         ### Objectives ###\n\n\
         Your ultimate goal is to confirm {client}'s appointment or reschedule it if necessary, \
         while remaining professional and courteous.\n\n\
         As the conversation progresses you'll follow a specific call flow and receive updates \
         on your current state.\n\n\
         ### Important Rules ###\n\n\
         1. You MUST only use actions that are valid for your current state.\n\
         2. Never attempt to skip states or use actions that aren't defined for your current state.\n\
         3. {example}\n\
         4. Always check which actions are valid before selecting an action.\n\
         5. Follow the conversation flow naturally while respecting the state machine constraints.",
        date = details.appointment_date,
        time = details.appointment_time,
        example = single_action_example(),
    );

    if include_listing {
        prompt.push_str("\n\n");
        prompt.push_str(&call_flow_listing());
    }

    prompt
}

fn single_action_example() -> String {
    let state = State::RescheduleOffering;
    let actions = registry::legal_actions(state)
        .iter()
        .map(|spec| format!("'{}'", spec.action))
        .collect::<Vec<_>>()
        .join(" or ");
    format!("For example, in the '{state}' state, you can ONLY use the {actions} action.")
}

fn call_flow_listing() -> String {
    let mut out = String::from("### Call Flow ###\n");
    for state in STATE_ORDER {
        out.push_str(&format!("\n{state}: {}\n", state.description()));
        let actions = registry::legal_actions(state);
        if actions.is_empty() {
            out.push_str("  (no actions, the call is over)\n");
        }
        for spec in actions {
            out.push_str(&format!(
                "  - {} -> {}: {}\n",
                spec.action, spec.next_state, spec.description
            ));
        }
    }
    out.trim_end().to_string()
}
