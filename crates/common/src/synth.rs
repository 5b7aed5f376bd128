//! Page class synthesis
//!
//! Turns an ordered list of recorded actions into page object class text: a
//! nested `GUIMap` class with one `By` declaration per action, followed by one
//! wrapper method per `click` / `sendKeys` action.
//!
//! Variable naming:
//! - base name is the camel-cased element label, or the locator value with
//!   non-alphanumerics stripped when there is no label
//! - `input` elements become `tbPassword` / `tbUserName` / `tb<Base>`
//! - `button` elements become `btn<Base>`
//! - everything else becomes `element<Base>`
//!
//! Two actions that map to the same name produce two identical declarations;
//! names are not disambiguated.

use crate::event::{ActionType, ElementType, RecordedAction};
use crate::locator::Locator;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"User Name"` → `"userName"`. Words are split on single spaces only.
fn camel_case(s: &str) -> String {
    s.split(' ')
        .enumerate()
        .map(|(i, word)| if i == 0 { lower_first(word) } else { capitalize(word) })
        .collect()
}

/// Compute the `GUIMap` field name for an element
pub fn variable_name(element_type: ElementType, label: Option<&str>, locator: &Locator) -> String {
    let base = match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => camel_case(label),
        None => locator
            .value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect(),
    };

    match element_type {
        ElementType::Input => {
            let lower = base.to_lowercase();
            if lower.contains("password") {
                "tbPassword".to_string()
            } else if lower.contains("username") || lower.contains("email") {
                "tbUserName".to_string()
            } else {
                format!("tb{}", capitalize(&base))
            }
        }
        ElementType::Button => format!("btn{}", capitalize(&base)),
        _ => format!("element{}", capitalize(&base)),
    }
}

fn method_for(action: ActionType, var_name: &str) -> Option<String> {
    match action {
        ActionType::SendKeys => {
            let name = if var_name.contains("Password") {
                "setPassword".to_string()
            } else if var_name.contains("UserName") {
                "setUserName".to_string()
            } else {
                format!("set{}", capitalize(var_name))
            };
            Some(format!(
                "    public void {}(String value) {{\n        driver.findElement(GUIMap.{}).sendKeys(value);\n    }}",
                name, var_name
            ))
        }
        ActionType::Click => Some(format!(
            "    public void click{}() {{\n        driver.findElement(GUIMap.{}).click();\n    }}",
            capitalize(var_name),
            var_name
        )),
        ActionType::DoubleClick | ActionType::Select => None,
    }
}

/// Synthesize page class text from actions in log order.
///
/// Actions without a parsed locator are skipped. The caller is expected to
/// have checked that `class_name` is non-empty.
pub fn synthesize<'a, I>(class_name: &str, actions: I) -> String
where
    I: IntoIterator<Item = &'a RecordedAction>,
{
    let mut declarations = Vec::new();
    let mut methods = Vec::new();

    for action in actions {
        let Some(locator) = action.locator.as_ref() else {
            tracing::debug!(code = %action.event.generated_code, "skipping action without locator");
            continue;
        };
        let var_name = variable_name(action.event.element_type, action.event.label(), locator);

        declarations.push(format!("        private static By {} = {};", var_name, locator));
        if let Some(method) = method_for(action.event.action_type, &var_name) {
            methods.push(method);
        }
    }

    format!(
        "public class {} {{\n\n    public static class GUIMap {{\n{}\n    }}\n\n{}\n}}",
        class_name,
        declarations.join("\n"),
        methods.join("\n\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ActionEvent;
    use crate::locator::LocatorStrategy;
    use test_case::test_case;

    fn action(element: &str, label: &str, action: &str, code: &str) -> RecordedAction {
        let line = serde_json::json!({
            "elementType": element,
            "elementLabel": label,
            "actionType": action,
            "generatedCode": code,
        })
        .to_string();
        RecordedAction::parse(&line).unwrap()
    }

    #[test_case(ElementType::Input, Some("Password"), "pwd" => "tbPassword" ; "input password label")]
    #[test_case(ElementType::Input, Some("Confirm Password"), "pwd2" => "tbPassword" ; "password anywhere")]
    #[test_case(ElementType::Input, Some("User Name"), "u" => "tbUserName" ; "camel cased username")]
    #[test_case(ElementType::Input, Some("Email address"), "e" => "tbUserName" ; "email maps to username")]
    #[test_case(ElementType::Input, Some("First Name"), "fn" => "tbFirstName" ; "plain input")]
    #[test_case(ElementType::Input, None, "search-box_1" => "tbSearchbox1" ; "input without label")]
    #[test_case(ElementType::Button, Some("Submit"), "button.submit" => "btnSubmit" ; "button")]
    #[test_case(ElementType::Button, Some("  Log in  "), "x" => "btnLogIn" ; "label trimmed")]
    #[test_case(ElementType::Link, Some("Home"), "a" => "elementHome" ; "link")]
    #[test_case(ElementType::Password, Some("Password"), "p" => "elementPassword" ; "password element type is not input")]
    #[test_case(ElementType::Div, None, "div > span:nth-of-type(2)" => "elementDivspannthoftype2" ; "stripped selector")]
    fn test_variable_name(element: ElementType, label: Option<&str>, value: &str) -> String {
        let loc = Locator::new(LocatorStrategy::CssSelector, value);
        variable_name(element, label, &loc)
    }

    #[test]
    fn test_login_page_password() {
        let a = action(
            "input",
            "Password",
            "sendKeys",
            r#"driver.findElement(By.id("pwd")).sendKeys("x");"#,
        );
        let out = synthesize("LoginPage", [&a]);
        assert!(out.starts_with("public class LoginPage {"));
        assert!(out.contains(r#"private static By tbPassword = By.id("pwd");"#));
        assert!(out.contains("public void setPassword(String value) {"));
        assert!(out.contains("driver.findElement(GUIMap.tbPassword).sendKeys(value);"));
    }

    #[test]
    fn test_click_button_method_name() {
        let a = action(
            "button",
            "Submit",
            "click",
            r#"driver.findElement(By.cssSelector("button.submit")).click();"#,
        );
        let out = synthesize("FormPage", [&a]);
        assert!(out.contains(r#"private static By btnSubmit = By.cssSelector("button.submit");"#));
        assert!(out.contains("public void clickBtnSubmit() {"));
    }

    #[test]
    fn test_exact_layout() {
        let user = action(
            "input",
            "User Name",
            "sendKeys",
            r#"driver.findElement(By.id("user")).sendKeys("bob");"#,
        );
        let go = action(
            "button",
            "Go",
            "click",
            r#"driver.findElement(By.name("go")).click();"#,
        );
        let out = synthesize("LoginPage", [&user, &go]);
        let expected = [
            "public class LoginPage {",
            "",
            "    public static class GUIMap {",
            r#"        private static By tbUserName = By.id("user");"#,
            r#"        private static By btnGo = By.name("go");"#,
            "    }",
            "",
            "    public void setUserName(String value) {",
            "        driver.findElement(GUIMap.tbUserName).sendKeys(value);",
            "    }",
            "",
            "    public void clickBtnGo() {",
            "        driver.findElement(GUIMap.btnGo).click();",
            "    }",
            "}",
        ]
        .join("\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_unparseable_code_skips_only_that_action() {
        let bad = action("button", "Broken", "click", "not a locator");
        let good = action(
            "button",
            "Save",
            "click",
            r#"driver.findElement(By.id("save")).click();"#,
        );
        let out = synthesize("EditPage", [&bad, &good]);
        assert!(!out.contains("Broken"));
        assert!(out.contains("clickBtnSave"));
    }

    #[test]
    fn test_other_actions_declare_without_method() {
        let sel = action(
            "select",
            "Country",
            "select",
            r#"new Select(driver.findElement(By.id("country"))).selectByVisibleText("NZ");"#,
        );
        let out = synthesize("AddressPage", [&sel]);
        assert!(out.contains(r#"private static By elementCountry = By.id("country");"#));
        assert!(!out.contains("public void"));
    }

    #[test]
    fn test_duplicate_names_not_disambiguated() {
        let a = action("button", "OK", "click", r#"By.id("ok1")"#);
        let b = action("button", "OK", "click", r#"By.id("ok2")"#);
        let out = synthesize("DialogPage", [&a, &b]);
        assert_eq!(out.matches("private static By btnOK =").count(), 2);
        assert_eq!(out.matches("public void clickBtnOK()").count(), 2);
    }

    #[test]
    fn test_deterministic() {
        let loc = Locator::new(LocatorStrategy::XPath, "/html/body/div[1]");
        let ev = ActionEvent::record(ElementType::Div, ActionType::Click, &loc, None);
        let a = RecordedAction::from_event(String::new(), ev);
        let first = synthesize("Page", [&a, &a]);
        let second = synthesize("Page", [&a, &a]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let out = synthesize("Empty", std::iter::empty::<&RecordedAction>());
        assert_eq!(out, "public class Empty {\n\n    public static class GUIMap {\n\n    }\n\n\n}");
    }
}
