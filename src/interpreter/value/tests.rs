use super::*;

#[test]
fn truthiness() {
    assert!(!Value::Boolean(false).is_truthy());
    assert!(Value::Boolean(true).is_truthy());
    assert!(!Value::Number(0.0).is_truthy());
    assert!(Value::Number(-0.5).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(Value::from("0").is_truthy());
}

#[test]
fn numeric_coercion() {
    assert_eq!(Value::from("42").to_numeric(), Value::Number(42.0));
    assert_eq!(Value::from(" -2.5 ").to_numeric(), Value::Number(-2.5));
    assert_eq!(Value::from(".5").to_numeric(), Value::Number(0.5));
    assert_eq!(Value::from("12abc").to_numeric(), Value::from("12abc"));
    assert_eq!(Value::from("inf").to_numeric(), Value::from("inf"));
    assert_eq!(Value::from("1e3").to_numeric(), Value::from("1e3"));
    assert_eq!(Value::from("-").to_numeric(), Value::from("-"));
    assert_eq!(Value::from("1.2.3").to_numeric(), Value::from("1.2.3"));
    assert_eq!(Value::Boolean(true).to_numeric(), Value::Boolean(true));
}

#[test]
fn numeric_value_leaves_text_untouched() {
    let text = Value::from(" 007 ");

    assert_eq!(text.numeric_value(), Some(7.0));
    assert_eq!(text, Value::from(" 007 "));
    assert_eq!(Value::Number(1.5).numeric_value(), Some(1.5));
    assert_eq!(Value::Boolean(true).numeric_value(), None);
}

#[test]
fn display() {
    assert_eq!(Value::Number(14.0).to_string(), "14");
    assert_eq!(Value::Number(2.5).to_string(), "2.5");
    assert_eq!(Value::Boolean(false).to_string(), "false");
    assert_eq!(Value::from("text").to_string(), "text");
}

#[test]
fn comparison_requires_matching_types() {
    assert_eq!(Value::Number(1.0).compare(&Value::Number(2.0)), Some(Ordering::Less));
    assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
    assert_eq!(Value::Boolean(true).compare(&Value::Boolean(true)), Some(Ordering::Equal));
    assert_eq!(Value::Number(1.0).compare(&Value::from("1")), None);
    assert!(!Value::Number(1.0).same_type(&Value::Boolean(true)));
}
