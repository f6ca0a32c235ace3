//! Client-facing reminder text.
//!
//! A fixed set of clinic-specific templates rather than a localization
//! engine. English and Spanish variants agree in number with the count of
//! pending questionnaires.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::cadence::days_between;
use crate::models::{FailureReason, Language};

/// Clinic identity used in every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicProfile {
    pub name: String,
    pub portal_url: String,
}

/// Everything needed to phrase a questionnaire reminder.
#[derive(Debug, Clone)]
pub struct ReminderContext<'a> {
    pub clinic: &'a ClinicProfile,
    /// Staff member the message is signed by.
    pub sender_name: &'a str,
    pub client_name: &'a str,
    pub pending_count: usize,
    pub language: Language,
    pub sent: Option<Date>,
    pub today: Date,
    /// Reminders already delivered; selects the template.
    pub reminder_count: u32,
    pub post_eval: bool,
}

#[derive(Debug, Clone)]
pub struct FailureContext<'a> {
    pub clinic: &'a ClinicProfile,
    pub sender_name: &'a str,
    pub client_name: &'a str,
    pub reason: &'a FailureReason,
    pub failed_date: Date,
    pub language: Language,
}

/// Build the reminder for a client's pending questionnaires.
///
/// Returns `None` when the message cannot be phrased: no send date, nothing
/// pending, or a reminder count past the last template.
pub fn build_reminder_message(ctx: &ReminderContext<'_>) -> Option<String> {
    let sent = ctx.sent?;
    if ctx.pending_count == 0 || ctx.reminder_count > 2 {
        return None;
    }
    let days = days_between(sent, ctx.today).unsigned_abs();
    let plural = ctx.pending_count > 1;

    let message = match ctx.language {
        Language::English => english_reminder(ctx, sent, days, plural),
        Language::Spanish => spanish_reminder(ctx, sent, days, plural),
    };
    Some(message)
}

/// Build the text for an open failure. Only portal and document failures
/// have client-facing copy.
pub fn build_failure_message(ctx: &FailureContext<'_>) -> Option<String> {
    let date = ctx.failed_date.strftime("%m/%d").to_string();
    let clinic = &ctx.clinic.name;
    let portal = &ctx.clinic.portal_url;
    let sender = ctx.sender_name;
    let client = ctx.client_name;

    let message = match (ctx.reason, ctx.language) {
        (FailureReason::PortalNotOpened, Language::English) => format!(
            "Hello, this is {sender} from {clinic}. We sent an invitation to the patient portal for {client} on {date}, but it has not been opened yet. Please open the invitation email and set up your account at {portal} so we can send the questionnaires needed for the evaluation. Thank you!"
        ),
        (FailureReason::DocsNotSigned, Language::English) => format!(
            "Hello, this is {sender} from {clinic}. There are documents for {client} in the patient portal at {portal} that still need to be signed. Please sign them as soon as possible so we can move forward with the evaluation. Thank you!"
        ),
        (FailureReason::PortalNotOpened, Language::Spanish) => format!(
            "Hola, le habla {sender} de {clinic}. Enviamos una invitación al portal de pacientes para {client} el {}, pero todavía no se ha abierto. Por favor abra el correo de invitación y cree su cuenta en {portal} para que podamos enviar los cuestionarios necesarios para la evaluación. ¡Gracias!",
            ctx.failed_date.strftime("%d/%m")
        ),
        (FailureReason::DocsNotSigned, Language::Spanish) => format!(
            "Hola, le habla {sender} de {clinic}. Hay documentos para {client} en el portal de pacientes en {portal} que todavía necesitan su firma. Por favor fírmelos lo antes posible para que podamos continuar con la evaluación. ¡Gracias!"
        ),
        _ => return None,
    };
    Some(message)
}

fn english_reminder(ctx: &ReminderContext<'_>, sent: Date, days: u64, plural: bool) -> String {
    let clinic = &ctx.clinic.name;
    let portal = &ctx.clinic.portal_url;
    let sender = ctx.sender_name;
    let client = ctx.client_name;

    let when = match days {
        0 => "today".to_string(),
        1 => format!("on {} (yesterday)", sent.strftime("%m/%d")),
        n => format!("on {} ({n} days ago)", sent.strftime("%m/%d")),
    };
    let noun = match (ctx.post_eval, plural) {
        (false, false) => "questionnaire",
        (false, true) => "questionnaires",
        (true, false) => "follow-up questionnaire",
        (true, true) => "follow-up questionnaires",
    };
    let there_is = if plural { "are" } else { "is a" };
    let is_are = if plural { "are" } else { "is" };
    let it_them = if plural { "them" } else { "it" };
    let it_is = if plural { "they are" } else { "it is" };

    match ctx.reminder_count {
        0 => format!(
            "Hello, this is {sender} from {clinic}. Please be on the lookout for an email from the patient portal as there {there_is} {noun} for {client} in your messages, sent {when}. Please let me know if you have any questions. Thank you for your time."
        ),
        1 => format!(
            "Hello, this is {sender} with {clinic}. It appears the {noun} for {client} sent {when} {is_are} still incomplete. You can find {it_them} in your messages in the patient portal at {portal}. Please complete {it_them} as soon as possible as we will be unable to effectively evaluate if {it_is} incomplete."
        ),
        _ => format!(
            "Hello, this is {sender} with {clinic}. This is a final reminder that the {noun} for {client} sent {when} {is_are} still incomplete. Please complete {it_them} in the patient portal at {portal} as soon as possible. If we do not hear back, someone from our office will call you to follow up."
        ),
    }
}

fn spanish_reminder(ctx: &ReminderContext<'_>, sent: Date, days: u64, plural: bool) -> String {
    let clinic = &ctx.clinic.name;
    let portal = &ctx.clinic.portal_url;
    let sender = ctx.sender_name;
    let client = ctx.client_name;

    let when = match days {
        0 => "hoy".to_string(),
        1 => format!("el {} (ayer)", sent.strftime("%d/%m")),
        n => format!("el {} (hace {n} días)", sent.strftime("%d/%m")),
    };
    let suffix = if ctx.post_eval { " de seguimiento" } else { "" };
    let (article, noun) = if plural {
        ("los", "cuestionarios")
    } else {
        ("el", "cuestionario")
    };
    let there_is = if plural {
        format!("hay {noun}{suffix}")
    } else {
        format!("hay un {noun}{suffix}")
    };
    let s = if plural { "s" } else { "" };
    let esta = if plural { "están" } else { "está" };
    let lo = if plural { "los" } else { "lo" };

    match ctx.reminder_count {
        0 => format!(
            "Hola, le habla {sender} de {clinic}. Por favor esté atento a un correo electrónico del portal de pacientes, ya que {there_is} para {client} en sus mensajes, enviado{s} {when}. Avíseme si tiene alguna pregunta. Gracias por su tiempo."
        ),
        1 => format!(
            "Hola, le habla {sender} de {clinic}. Parece que {article} {noun}{suffix} para {client} enviado{s} {when} todavía {esta} incompleto{s}. Puede encontrar{lo} en sus mensajes en el portal de pacientes en {portal}. Por favor complételo{s} lo antes posible, ya que no podremos evaluar adecuadamente si {esta} incompleto{s}."
        ),
        _ => format!(
            "Hola, le habla {sender} de {clinic}. Este es un último recordatorio de que {article} {noun}{suffix} para {client} enviado{s} {when} todavía {esta} incompleto{s}. Por favor complételo{s} en el portal de pacientes en {portal} lo antes posible. Si no recibimos respuesta, alguien de nuestra oficina le llamará."
        ),
    }
}
