use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use super::model::{Bhk, Choice, City, CreateBuyerInput, PropertyType, Purpose, Source, Timeline};

/// One problem with one field of the payload. An empty `path` addresses the
/// payload as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Comma-separated tags, trimmed, with empty segments dropped.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validates a lead-creation payload, collecting every issue rather than
/// stopping at the first one.
pub fn validate_create_buyer(payload: &Value) -> Result<CreateBuyerInput, Vec<ValidationIssue>> {
    let Some(obj) = payload.as_object() else {
        return Err(vec![ValidationIssue::new("", "Expected an object")]);
    };
    let mut f = Fields {
        obj,
        issues: Vec::new(),
    };

    let full_name = f.required_string("fullName");
    if matches!(&full_name, Some(n) if n.chars().count() < 2) {
        f.issue("fullName", "Full name is required");
    }

    let email = f.optional_string("email");
    if matches!(&email, Some(e) if !is_valid_email(e)) {
        f.issue("email", "Invalid email");
    }

    let phone = f.required_string("phone");
    if matches!(&phone, Some(p) if p.chars().count() < 10) {
        f.issue("phone", "Phone number must be at least 10 digits");
    }

    let city = f.required_choice::<City>("city");
    let property_type = f.required_choice::<PropertyType>("propertyType");
    let bhk = f.optional_choice::<Bhk>("bhk");
    let purpose = f.required_choice::<Purpose>("purpose");
    let budget_min = f.budget("budgetMin");
    let budget_max = f.budget("budgetMax");
    let timeline = f.required_choice::<Timeline>("timeline");
    let source = f.required_choice::<Source>("source");
    let notes = f.optional_string("notes");
    let tags = f.optional_string("tags").map(|t| parse_tags(&t)).unwrap_or_default();

    if let (Some(pt), None) = (property_type, bhk) {
        if pt.has_rooms() && !f.has_issue("bhk") {
            f.issue("bhk", "BHK is required for Apartment and Villa");
        }
    }

    if let (Some(min), Some(max)) = (budget_min, budget_max) {
        if min > max {
            f.issue("budgetMax", "Max budget must be greater than Min budget");
        }
    }

    if !f.issues.is_empty() {
        return Err(f.issues);
    }

    match (full_name, phone, city, property_type, purpose, timeline, source) {
        (
            Some(full_name),
            Some(phone),
            Some(city),
            Some(property_type),
            Some(purpose),
            Some(timeline),
            Some(source),
        ) => Ok(CreateBuyerInput {
            full_name,
            email,
            phone,
            city,
            property_type,
            bhk,
            purpose,
            budget_min,
            budget_max,
            timeline,
            source,
            notes,
            tags,
        }),
        // every missing required field has recorded an issue above
        _ => Err(vec![ValidationIssue::new("", "Invalid payload")]),
    }
}

struct Fields<'a> {
    obj: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> Fields<'a> {
    fn issue(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(path, message));
    }

    fn has_issue(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path == path)
    }

    /// `null` counts as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key).filter(|v| !v.is_null())
    }

    fn required_string(&mut self, key: &str) -> Option<String> {
        match self.get(key) {
            None => {
                self.issue(key, "Required");
                None
            }
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => {
                self.issue(key, "Expected string");
                None
            }
        }
    }

    /// Blank strings count as absent.
    fn optional_string(&mut self, key: &str) -> Option<String> {
        match self.get(key) {
            None => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(_) => {
                self.issue(key, "Expected string");
                None
            }
        }
    }

    fn required_choice<C: Choice>(&mut self, key: &str) -> Option<C> {
        match self.get(key) {
            None => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(_) => return self.optional_choice(key),
        }
        self.issue(key, "Required");
        None
    }

    fn optional_choice<C: Choice>(&mut self, key: &str) -> Option<C> {
        match self.get(key) {
            None => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => {
                let parsed = C::parse(s);
                if parsed.is_none() {
                    let message = format!("Expected {}, received '{}'", C::expected(), s);
                    self.issue(key, message);
                }
                parsed
            }
            Some(_) => {
                self.issue(key, "Expected string");
                None
            }
        }
    }

    /// Whole, non-negative amount given as a JSON number or numeric string.
    /// Integers are taken exactly; only fractional or exponent forms go through `f64`.
    fn budget(&mut self, key: &str) -> Option<i64> {
        let parsed = match self.get(key) {
            None => return None,
            Some(Value::Number(n)) => match (n.as_i64(), n.as_u64()) {
                (Some(v), _) => Ok(v),
                (None, Some(_)) => Err("Budget is too large"),
                (None, None) => whole_amount(n.as_f64()),
            },
            Some(Value::String(s)) if s.trim().is_empty() => return None,
            Some(Value::String(s)) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(v) => Ok(v),
                    Err(_) if s.parse::<i128>().is_ok() => Err("Budget is too large"),
                    Err(_) => whole_amount(s.parse::<f64>().ok()),
                }
            }
            Some(_) => Err("Expected number"),
        };
        match parsed {
            Ok(v) if v < 0 => {
                self.issue(key, "Budget cannot be negative");
                None
            }
            Ok(v) => Some(v),
            Err(message) => {
                self.issue(key, message);
                None
            }
        }
    }
}

fn whole_amount(number: Option<f64>) -> Result<i64, &'static str> {
    // 2^63, the first value past i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let Some(number) = number.filter(|v| v.is_finite()) else {
        return Err("Expected number");
    };
    if number < 0.0 {
        Err("Budget cannot be negative")
    } else if number.fract() != 0.0 {
        Err("Budget must be a whole amount")
    } else if number >= LIMIT {
        Err("Budget is too large")
    } else {
        Ok(number as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "fullName": "Asha Verma",
            "phone": "9876543210",
            "city": "Chandigarh",
            "propertyType": "Plot",
            "purpose": "Buy",
            "timeline": "EXPLORING",
            "source": "Website"
        })
    }

    fn with(mut base: Value, key: &str, value: Value) -> Value {
        base[key] = value;
        base
    }

    fn paths(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.path.as_str()).collect()
    }

    #[test]
    fn accepts_minimal_payload_with_defaults() {
        let input = validate_create_buyer(&minimal()).expect("valid");
        assert_eq!(input.full_name, "Asha Verma");
        assert_eq!(input.city, City::Chandigarh);
        assert_eq!(input.email, None);
        assert_eq!(input.bhk, None);
        assert_eq!(input.budget_min, None);
        assert!(input.tags.is_empty());
    }

    #[test]
    fn rejects_min_budget_above_max_on_budget_max() {
        let payload = with(
            with(minimal(), "budgetMin", json!(500000)),
            "budgetMax",
            json!(100000),
        );
        let issues = validate_create_buyer(&payload).unwrap_err();
        assert_eq!(paths(&issues), vec!["budgetMax"]);
        assert_eq!(issues[0].message, "Max budget must be greater than Min budget");
    }

    #[test]
    fn accepts_ordered_budget_range_and_coerces_strings() {
        let payload = with(
            with(minimal(), "budgetMin", json!("100000")),
            "budgetMax",
            json!(500000),
        );
        let input = validate_create_buyer(&payload).expect("valid");
        assert_eq!(input.budget_min, Some(100_000));
        assert_eq!(input.budget_max, Some(500_000));
    }

    #[test]
    fn budgets_must_be_whole_non_negative_numbers() {
        let issues = validate_create_buyer(&with(minimal(), "budgetMin", json!(-1))).unwrap_err();
        assert_eq!(paths(&issues), vec!["budgetMin"]);

        let issues = validate_create_buyer(&with(minimal(), "budgetMax", json!("lots"))).unwrap_err();
        assert_eq!(issues[0].message, "Expected number");

        let issues = validate_create_buyer(&with(minimal(), "budgetMax", json!(10.5))).unwrap_err();
        assert_eq!(paths(&issues), vec!["budgetMax"]);

        let input = validate_create_buyer(&with(minimal(), "budgetMax", json!(""))).expect("blank");
        assert_eq!(input.budget_max, None);

        let input = validate_create_buyer(&with(minimal(), "budgetMax", json!(2.5e5))).expect("float");
        assert_eq!(input.budget_max, Some(250_000));
    }

    #[test]
    fn large_integer_budgets_are_kept_exactly() {
        let payload = with(
            with(minimal(), "budgetMin", json!(9_007_199_254_740_993_i64)),
            "budgetMax",
            json!(i64::MAX),
        );
        let input = validate_create_buyer(&payload).expect("valid");
        assert_eq!(input.budget_min, Some(9_007_199_254_740_993));
        assert_eq!(input.budget_max, Some(i64::MAX));

        let input = validate_create_buyer(&with(minimal(), "budgetMin", json!("9007199254740993")))
            .expect("numeric string");
        assert_eq!(input.budget_min, Some(9_007_199_254_740_993));
    }

    #[test]
    fn budgets_beyond_i64_are_rejected_not_saturated() {
        let issues = validate_create_buyer(&with(
            minimal(),
            "budgetMax",
            json!(9_223_372_036_854_775_808_u64),
        ))
        .unwrap_err();
        assert_eq!(paths(&issues), vec!["budgetMax"]);
        assert_eq!(issues[0].message, "Budget is too large");

        let issues = validate_create_buyer(&with(
            minimal(),
            "budgetMin",
            json!("9223372036854775808"),
        ))
        .unwrap_err();
        assert_eq!(issues[0].message, "Budget is too large");

        let issues = validate_create_buyer(&with(minimal(), "budgetMin", json!(1e19))).unwrap_err();
        assert_eq!(issues[0].message, "Budget is too large");
    }

    #[test]
    fn tags_are_trimmed_in_order() {
        let payload = with(minimal(), "tags", json!("verified, interested,  hot"));
        let input = validate_create_buyer(&payload).expect("valid");
        assert_eq!(input.tags, vec!["verified", "interested", "hot"]);
    }

    #[test]
    fn empty_tag_segments_are_dropped() {
        assert_eq!(parse_tags("a,,b, ,c,"), vec!["a", "b", "c"]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn bhk_required_for_dwellings() {
        let payload = with(minimal(), "propertyType", json!("Apartment"));
        let issues = validate_create_buyer(&payload).unwrap_err();
        assert_eq!(paths(&issues), vec!["bhk"]);

        let payload = with(payload, "bhk", json!("Two"));
        let input = validate_create_buyer(&payload).expect("valid");
        assert_eq!(input.bhk, Some(Bhk::Two));
    }

    #[test]
    fn bhk_optional_for_other_property_types() {
        let payload = with(minimal(), "propertyType", json!("Office"));
        assert!(validate_create_buyer(&payload).is_ok());
    }

    #[test]
    fn collects_every_field_issue() {
        let payload = json!({
            "fullName": "A",
            "email": "not-an-email",
            "phone": "12345",
            "city": "Delhi",
            "propertyType": "Plot",
            "purpose": "Lease",
            "timeline": "EXPLORING",
            "source": 7
        });
        let issues = validate_create_buyer(&payload).unwrap_err();
        assert_eq!(
            paths(&issues),
            vec!["fullName", "email", "phone", "city", "purpose", "source"]
        );
        assert!(issues[3].message.contains("Chandigarh | Mohali"));
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let issues = validate_create_buyer(&json!({})).unwrap_err();
        assert_eq!(
            paths(&issues),
            vec!["fullName", "phone", "city", "propertyType", "purpose", "timeline", "source"]
        );
        assert!(issues.iter().all(|i| i.message == "Required"));
    }

    #[test]
    fn non_object_payload_is_a_root_issue() {
        let issues = validate_create_buyer(&json!([1, 2])).unwrap_err();
        assert_eq!(paths(&issues), vec![""]);
    }

    #[test]
    fn blank_optional_strings_are_absent() {
        let payload = with(with(minimal(), "email", json!("")), "notes", json!("  "));
        let input = validate_create_buyer(&payload).expect("valid");
        assert_eq!(input.email, None);
        assert_eq!(input.notes, None);
    }

    #[test]
    fn email_format() {
        assert!(is_valid_email("a@b.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
    }
}
