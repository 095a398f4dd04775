use crate::models::{Action, AppointmentDetails, CallData, State};

const INSTRUCTION_OPEN: &str = "<instruction>";
const INSTRUCTION_CLOSE: &str = "</instruction>";

pub const WRAP_UP_TEXT: &str = "This conversation has been going on for too long. Wrap it up.";

pub fn wrap_instruction(text: &str) -> String {
    format!("{INSTRUCTION_OPEN}{text}{INSTRUCTION_CLOSE}")
}

pub fn render(
    state: State,
    details: &AppointmentDetails,
    call_data: &CallData,
    previous_state: Option<State>,
) -> String {
    match state {
        State::Initial => initial(details),
        State::IdentityChecking => identity_checking(details),
        State::AttendanceChecking => attendance_checking(details),
        State::AppointmentConfirmed => appointment_confirmed(details),
        State::RescheduleOffering => reschedule_offering(details),
        State::RescheduleChecking => reschedule_checking(details),
        State::RescheduleConfirmed => reschedule_confirmed(details, call_data),
        State::AppointmentCancelled => appointment_cancelled(),
        State::CallEnded => call_ended(details, call_data, previous_state),
    }
}

pub fn render_named(
    state: &str,
    details: &AppointmentDetails,
    call_data: &CallData,
    previous_state: Option<State>,
) -> String {
    let resolved = State::parse(state).unwrap_or_else(|| {
        tracing::warn!(state, "no template for state, using initial");
        State::Initial
    });
    render(resolved, details, call_data, previous_state)
}

fn initial(d: &AppointmentDetails) -> String {
    format!(
        "Preparing to make an outbound call to {name} regarding the appointment on {date} at {time}.\n\n\
         To start the call, select \"{start}\".",
        name = d.client_name,
        date = d.appointment_date,
        time = d.appointment_time,
        start = Action::StartCall,
    )
}

fn identity_checking(d: &AppointmentDetails) -> String {
    format!(
        "You have just made an outbound phone call. Say something like:\n\
         \"Hi, I am a virtual assistant calling from {company}. Is {name} available?\"\n\n\
         If they aren't {name} and don't know who {name} is, apologize for the confusion, \
         thank them for their time, and select \"{wrong}\".\n\n\
         If they say they are {name}, select \"{confirm}\".",
        company = d.company_name,
        name = d.client_name,
        wrong = Action::WrongNumber,
        confirm = Action::ConfirmIdentity,
    )
}

fn attendance_checking(d: &AppointmentDetails) -> String {
    format!(
        "Say something like: \"Hi {first}, I'm calling to confirm your upcoming appointment \
         scheduled for {date} at {time}. Is that still going to work for you?\"\n\n\
         If they confirm they can attend, express that you're looking forward to seeing them. \
         Say something like:\n\
         \"Great! We're looking forward to seeing you on {date} at {time}. Have a wonderful day!\"\n\n\
         Then select \"{can}\".\n\n\
         If they say they cannot attend, select \"{cannot}\".",
        first = d.first_name(),
        date = d.appointment_date,
        time = d.appointment_time,
        can = Action::CanAttend,
        cannot = Action::CannotAttend,
    )
}

fn appointment_confirmed(d: &AppointmentDetails) -> String {
    format!(
        "We're all set! You are confirmed for your appointment on {date} at {time}.\n\n\
         Thank them for their time and select \"{end}\" to end the call.",
        date = d.appointment_date,
        time = d.appointment_time,
        end = Action::EndCall,
    )
}

fn reschedule_offering(d: &AppointmentDetails) -> String {
    let alternatives = d.alternatives();
    let offer = if alternatives.is_empty() {
        "Say something like:\n\
         \"I'm sorry to hear that. Let's find a time that works better for you. \
         What day and time would suit you?\"\n\n\
         There are no pre-arranged alternative times. Ask for their preferred date and time \
         and use the checkDesiredDate tool to see what is open."
            .to_string()
    } else {
        let listed = alternatives
            .iter()
            .map(|alt| format!("- {alt}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Say something like:\n\
             \"I'm sorry to hear that. We do have a couple of alternative times available. \
             Would any of these work better for you?\"\n\n\
             Offer the following alternative times:\n{listed}"
        )
    };

    format!(
        "{offer}\n\n\
         After offering these alternatives, select \"{offered}\".\n\n\
         NOTE: The only valid action in this state is \"{offered}\". \
         You cannot use \"{can}\" or \"{cannot}\" directly from this state.",
        offered = Action::OfferAlternatives,
        can = Action::CanReschedule,
        cannot = Action::CannotReschedule,
    )
}

fn reschedule_checking(d: &AppointmentDetails) -> String {
    format!(
        "Find out if {name} can make any of the alternative appointment times. \
         If they suggest a different time, use the checkDesiredDate tool to confirm it is open.\n\n\
         If they can make one of the times, collect their preferred date and time, and select \
         \"{can}\" with additionalData containing \"rescheduled_date\" and \"rescheduled_time\".\n\n\
         If they cannot make any of the alternative times, select \"{cannot}\".",
        name = d.client_name,
        can = Action::CanReschedule,
        cannot = Action::CannotReschedule,
    )
}

fn reschedule_confirmed(d: &AppointmentDetails, data: &CallData) -> String {
    format!(
        "Confirm their selection by saying something like:\n\
         \"Great! I've rescheduled your appointment for {when}. \
         We look forward to seeing you then, {first}. \
         Is there anything else I can help you with today?\"\n\n\
         Address any additional questions they might have, then thank them for their time \
         and select \"{end}\".",
        when = rescheduled_when(data),
        first = d.first_name(),
        end = Action::EndCall,
    )
}

fn appointment_cancelled() -> String {
    format!(
        "Let them know you'll cancel the current appointment by saying something like:\n\
         \"I understand. I'll cancel the appointment for now. \
         Please feel free to reach out to us in the future when you'd like to reschedule. \
         Thank you for letting us know, and we hope to see you soon!\"\n\n\
         Select \"{end}\" to end the call.",
        end = Action::EndCall,
    )
}

fn call_ended(d: &AppointmentDetails, data: &CallData, previous: Option<State>) -> String {
    let summary = if data.has_reschedule() {
        format!(
            "The appointment has been rescheduled for {}.",
            rescheduled_when(data)
        )
    } else if previous == Some(State::AppointmentConfirmed) {
        format!(
            "The original appointment on {} at {} is confirmed.",
            d.appointment_date, d.appointment_time
        )
    } else if previous == Some(State::AppointmentCancelled) {
        "The appointment has been cancelled.".to_string()
    } else {
        "Call ended without confirmation or rescheduling.".to_string()
    };

    format!("The call has ended.\n\n{summary}")
}

fn rescheduled_when(data: &CallData) -> String {
    let date = data
        .rescheduled_date
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("the new date");
    match data
        .rescheduled_time
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        Some(time) => format!("{date} at {time}"),
        None => date.to_string(),
    }
}
