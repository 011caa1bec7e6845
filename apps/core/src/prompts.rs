//! Fy's persona and per-intent prompt templates.

use crate::brain::Intent;
use crate::models::ChatMessage;
use crate::services::analysis::AnalysisResult;

/// Base personality, sent as the system message of every generation request.
pub const FY_SYSTEM_PROMPT: &str = "Eres Fy, asistente de ciberseguridad de Trackfy.

PERSONALIDAD:
- Cercano y directo. Como un amigo experto.
- Hablas de tú, tono casual pero profesional.
- Explicas sin jerga técnica.
- Emojis: ✅ ⚠️ 🚨 🛡️ (solo uno por mensaje)

REGLAS IMPORTANTES:
- MÁXIMO 2-3 frases. Sé muy conciso.
- Primero veredicto + emoji, luego razón breve, luego acción.
- NUNCA digas \"como modelo de IA\" ni \"el análisis técnico\".
- NO repitas información. Una frase = una idea.

CONTEXTO:
- Proteges a usuarios no técnicos (35-65 años, España) de estafas online.
";

/// Structured inputs for the intent-specific prompt block.
///
/// One variant per intent keeps every template's required fields explicit:
/// a missing field is a compile error, not a formatting-time surprise.
#[derive(Debug, Clone)]
pub enum PromptPayload {
    Analysis {
        entity_type: String,
        content: String,
        risk_level: i32,
        verdict: String,
        reasons: String,
        found_in_db: bool,
        source: Option<String>,
    },
    Rescue {
        situation: String,
    },
    Question {
        topic: String,
    },
    NeedsInfo {
        message: String,
        missing: String,
    },
    Report,
    Smalltalk {
        message: String,
    },
}

impl PromptPayload {
    /// Select the payload for a turn.
    ///
    /// An Analysis intent without an analysis result (keywords scored but
    /// nothing was extractable) falls through to casual handling.
    pub fn for_turn(
        intent: Intent,
        anonymized_message: &str,
        analysis: Option<&AnalysisResult>,
        triggers: &[String],
    ) -> Self {
        match intent {
            Intent::Analysis => match analysis {
                Some(result) => Self::from_analysis(result),
                None => PromptPayload::Smalltalk {
                    message: anonymized_message.to_string(),
                },
            },
            Intent::Rescue => PromptPayload::Rescue {
                situation: anonymized_message.to_string(),
            },
            Intent::Question => PromptPayload::Question {
                topic: anonymized_message.to_string(),
            },
            Intent::NeedsInfo => PromptPayload::NeedsInfo {
                message: anonymized_message.to_string(),
                missing: missing_datum(triggers),
            },
            Intent::Report => PromptPayload::Report,
            Intent::Smalltalk => PromptPayload::Smalltalk {
                message: anonymized_message.to_string(),
            },
        }
    }

    fn from_analysis(result: &AnalysisResult) -> Self {
        let reasons = if result.reasons.is_empty() {
            "- Sin información adicional".to_string()
        } else {
            result
                .reasons
                .iter()
                .map(|r| format!("- {}", r))
                .collect::<Vec<_>>()
                .join("\n")
        };

        PromptPayload::Analysis {
            entity_type: result
                .entity_type
                .map(|t| t.label().to_string())
                .unwrap_or_else(|| "desconocido".to_string()),
            content: result.content.clone().unwrap_or_default(),
            risk_level: result.risk_score,
            verdict: result.verdict.label().to_string(),
            reasons,
            found_in_db: result.found_in_db,
            source: result.source.clone(),
        }
    }

    /// Render the intent-specific instruction block.
    pub fn render(&self) -> String {
        match self {
            PromptPayload::Analysis {
                entity_type,
                content,
                risk_level,
                verdict,
                reasons,
                found_in_db,
                source,
            } => {
                let db_line = if *found_in_db {
                    format!(
                        "\nEn base de datos de amenazas: sí (fuente: {})",
                        source.as_deref().unwrap_or("localdb")
                    )
                } else {
                    String::new()
                };
                format!(
                    "\nANÁLISIS:\nTipo: {entity_type} | Contenido: {content}\nRiesgo: {risk_level}/100 | Veredicto: {verdict}{db_line}\nRazones:\n{reasons}\n\nRESPONDE EN MÁXIMO 2-3 FRASES:\n- Veredicto: safe=✅ | suspicious=⚠️ | dangerous=🚨\n- Si suplanta marca, di el dominio oficial (ej: \"El oficial es dgt.es\")\n- Termina con acción concreta\n\nSi es safe y oficial: confirma brevemente que es seguro.\nSi suplanta: menciona dominio oficial.\n"
                )
            }
            PromptPayload::Rescue { situation } => format!(
                "\nSITUACIÓN DE EMERGENCIA:\nEl usuario indica que: {situation}\n\nResponde como Fy en modo rescate:\n1. Primero tranquilízale brevemente (1 frase)\n2. Haz UNA pregunta clave para entender mejor qué pasó\n3. NO des todos los pasos todavía, espera más información\n\nMantén la calma, sé empático pero eficiente.\n"
            ),
            PromptPayload::Question { topic } => format!(
                "\nEl usuario pregunta sobre: {topic}\n\nResponde como Fy:\n- Explica de forma simple y clara\n- Usa ejemplos cotidianos si ayuda\n- Incluye un consejo práctico al final\n"
            ),
            PromptPayload::NeedsInfo { message, missing } => format!(
                "\nEl usuario menciona algo sospechoso pero NO ha incluido el dato concreto.\nMensaje: {message}\nFalta: {missing}\n\nResponde como Fy:\n- Pide amablemente {missing} para poder analizarlo\n- Explica en una frase por qué lo necesitas\n- NO des un veredicto todavía\n"
            ),
            PromptPayload::Report => "\nEl usuario quiere reportar una estafa.\n\nResponde como Fy con la guía de reporte:\n1. Agradece el aviso en una frase.\n2. Indica los canales oficiales: el 017 (INCIBE) y la denuncia online de la Policía Nacional (policia.es).\n3. Recuérdale que no borre las pruebas (mensajes, capturas, números).\n".to_string(),
            PromptPayload::Smalltalk { message } => format!(
                "\nEl usuario dice: {message}\n\nResponde como Fy de forma breve y natural.\nSé simpático pero intenta llevar la conversación hacia cómo puedes ayudarle con su seguridad digital.\n"
            ),
        }
    }
}

/// Guess which datum the user left out, from the classifier triggers.
fn missing_datum(triggers: &[String]) -> String {
    let hit = |needle: &str| triggers.iter().any(|t| t.contains(needle));

    if hit("llama") || hit("número") {
        "el número de teléfono que te contactó".to_string()
    } else if hit("correo") || hit("email") {
        "la dirección de correo del remitente".to_string()
    } else if hit("sms") || hit("mensaje") {
        "el texto del mensaje o el enlace que incluye".to_string()
    } else {
        "el dato concreto (enlace, número o correo)".to_string()
    }
}

/// Assemble the full generation request: persona, recent context window and
/// the user turn carrying the anonymized message plus the intent block.
pub fn build_messages(
    anonymized_message: &str,
    payload: &PromptPayload,
    context: Option<&[ChatMessage]>,
    max_context_messages: usize,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(FY_SYSTEM_PROMPT)];

    if let Some(context) = context {
        let skip = context.len().saturating_sub(max_context_messages);
        messages.extend(context[skip..].iter().cloned());
    }

    messages.push(ChatMessage::user(format!(
        "{}\n\n{}",
        anonymized_message,
        payload.render()
    )));

    messages
}
