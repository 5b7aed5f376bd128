//! Send Command
//!
//! Emulates the browser recorder: builds one action record, renders its
//! generated code, and posts it to the relay. A failed post is reported and
//! not retried.

use anyhow::Result;
use clap::Args;
use pagecast_common::{
    ActionEvent, ActionType, ElementType, Locator, LocatorStrategy, RecordedAction,
};

use crate::client::RelayClient;
use crate::output::{print_item, print_success, EntryDisplay, OutputFormat};

#[derive(Args)]
pub struct SendArgs {
    /// Interaction (click, doubleClick, sendKeys, select)
    #[arg(short, long, default_value = "click")]
    pub action: ActionType,

    /// Element type (button, input, link, ...)
    #[arg(short, long, default_value = "element")]
    pub element: ElementType,

    /// Locator strategy (id, name, cssSelector/css, xpath)
    #[arg(short, long, default_value = "id")]
    pub by: LocatorStrategy,

    /// Locator value
    pub locator: String,

    /// Human-readable element label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Typed text or selected option
    #[arg(long)]
    pub value: Option<String>,

    /// Link target, for link elements
    #[arg(long)]
    pub href: Option<String>,

    /// Leave the timestamp for the relay to fill in
    #[arg(long)]
    pub no_timestamp: bool,
}

impl SendArgs {
    /// The record a recorder would have produced for these arguments
    pub fn to_event(&self) -> ActionEvent {
        let locator = Locator::new(self.by.clone(), self.locator.clone());
        let mut event =
            ActionEvent::record(self.element, self.action, &locator, self.value.clone());
        if let Some(label) = &self.label {
            event = event.with_label(label.clone());
        }
        if let Some(href) = &self.href {
            event = event.with_href(href.clone());
        }
        if !self.no_timestamp {
            event = event.with_timestamp(pagecast_common::iso_timestamp());
        }
        event
    }
}

pub async fn execute(args: SendArgs, client: &RelayClient, format: OutputFormat) -> Result<()> {
    let event = args.to_event();
    tracing::debug!(code = %event.generated_code, "sending action");

    let resp = client.send_action(&event).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&resp.data)?),
        _ => {
            print_success(&resp.message);
            let raw = resp.data.to_string();
            let echoed = RecordedAction::from_event(raw, serde_json::from_value(resp.data)?);
            print_item(&EntryDisplay::new(0, &echoed), format);
        }
    }

    Ok(())
}
