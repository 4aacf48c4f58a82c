//! Role and identity resolution from institutional email addresses.
//!
//! Pure, side-effect free: the same input always yields the same identity.
//! Pattern rules are evaluated in priority order, first match wins.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::domain::{Role, ValidationError};

/// Primary institutional domain (staff and admin accounts).
pub const INSTITUTIONAL_DOMAIN: &str = "itsur.edu.mx";
/// Student sub-domain; local parts are 8-digit matriculas.
pub const STUDENT_DOMAIN: &str = "alumnos.itsur.edu.mx";
/// Legacy staff domain, still routed to the teacher role.
pub const LEGACY_DOMAIN: &str = "itsur.mx";

fn admin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^admin(\.[a-z0-9]+)?@{}$",
            regex::escape(INSTITUTIONAL_DOMAIN)
        ))
        .unwrap()
    })
}

fn student_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^([0-9]{{8}})@{}$",
            regex::escape(STUDENT_DOMAIN)
        ))
        .unwrap()
    })
}

fn teacher_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^[a-z]+\.[a-z]+@{}$",
            regex::escape(INSTITUTIONAL_DOMAIN)
        ))
        .unwrap()
    })
}

/// Identity derived from an email address.
///
/// Equality and hashing are on the normalized email, so two inputs differing
/// only in case or surrounding whitespace resolve to equal identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedIdentity {
    /// Trimmed, lower-cased address.
    pub email: String,
    pub role: Role,
    /// 8-digit student identifier, present only for the student role.
    pub matricula: Option<String>,
}

impl PartialEq for ResolvedIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl Eq for ResolvedIdentity {}

impl Hash for ResolvedIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.email.hash(state);
    }
}

/// Resolve an email address to a role and, for students, a matricula.
///
/// Rules, first match wins:
/// 1. `admin` local-part convention under the institutional domain -> `Admin`
/// 2. 8-digit local part under the student sub-domain -> `Student`
/// 3. `firstname.lastname` under the institutional domain -> `Teacher`
/// 4. any address under the legacy domain -> `Teacher`
/// 5. anything else -> `Guest`
///
/// # Errors
///
/// `ValidationError::EmptyEmail` when the input is empty or whitespace-only.
pub fn resolve(email: &str) -> Result<ResolvedIdentity, ValidationError> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }

    if admin_re().is_match(&normalized) {
        return Ok(ResolvedIdentity {
            email: normalized,
            role: Role::Admin,
            matricula: None,
        });
    }

    if let Some(caps) = student_re().captures(&normalized) {
        let matricula = caps[1].to_string();
        return Ok(ResolvedIdentity {
            email: normalized,
            role: Role::Student,
            matricula: Some(matricula),
        });
    }

    if teacher_re().is_match(&normalized) {
        return Ok(ResolvedIdentity {
            email: normalized,
            role: Role::Teacher,
            matricula: None,
        });
    }

    if normalized.ends_with(&format!("@{LEGACY_DOMAIN}")) {
        return Ok(ResolvedIdentity {
            email: normalized,
            role: Role::Teacher,
            matricula: None,
        });
    }

    Ok(ResolvedIdentity {
        email: normalized,
        role: Role::Guest,
        matricula: None,
    })
}

/// Suggest a display name from the email local part.
///
/// `maria.lopez@...` becomes "Maria Lopez"; numeric local parts are kept
/// verbatim.
pub fn display_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    local
        .split('.')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
