//! Requires chromedriver running on port 4444:
//!
//!     chromedriver --port=4444
//!
//! and a page with a `select` element whose id is `country`, served at the
//! url given as the first argument.
//!
//! Run as follows:
//!
//!     RUST_LOG=debug cargo run --example combobox -- http://localhost:8080/form.html

use widgetdriver_sync::prelude::*;
use widgetdriver_sync::session_store::{SessionInfo, SessionStore};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::init();

    let url = std::env::args().nth(1).unwrap_or_else(|| "http://localhost:8080/form.html".to_string());

    let caps = DesiredCapabilities::chrome();
    let driver = WebDriver::new("http://localhost:4444", &caps)?;

    // Remember the session so another process can find it.
    let store = SessionStore::new();
    let session_id = driver.session_id().to_string();
    store.store(&SessionInfo::new("combobox-demo", "http://localhost:4444", &session_id, "chrome"))?;

    driver.get(url.as_str())?;

    {
        let combo = ComboBox::new(driver.find_element(By::Id("country"))?)?;
        println!("options: {:?}", combo.get_data_list()?);

        // Select by partial text, then by index. Both verify the selection.
        let selected = combo.select("Nor", true, true, false)?;
        println!("selected: {:?}", selected);
        let selected = combo.select_index(0, true, false)?;
        println!("selected: {:?}", selected);
    }

    store.delete("combobox-demo")?;
    driver.quit()?;

    Ok(())
}
