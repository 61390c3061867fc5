/*
 *  display/factory.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  Factory for the canvas sink named in configuration
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::path::Path;

use crate::config::{DriverKind, PanelSettings};
use crate::display::drivers::LinuxPanel;
use crate::display::error::DisplayFactoryError;
use crate::display::traits::BoxedSink;
use log::{info, warn};

/// Factory for creating canvas sinks from configuration
pub struct SinkFactory;

impl SinkFactory {
    /// Create the sink described by `settings`
    ///
    /// Returns `Ok(None)` when the service should run without a panel:
    /// headless mode, `driver: none`, or no SPI device node on this host.
    /// The controller is not initialized here; `DisplayState` does that
    /// when it takes ownership.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let panel = config.panel()?;
    /// let sink = SinkFactory::create_from_config(&panel)?;
    /// let state = DisplayState::new(panel.width, panel.height, sink)?;
    /// ```
    pub fn create_from_config(
        settings: &PanelSettings
    ) -> Result<Option<BoxedSink>, DisplayFactoryError> {
        if settings.headless || settings.driver == DriverKind::NoPanel {
            info!("Headless mode - rendering without a panel");
            return Ok(None);
        }

        if !Path::new(&settings.spi_bus).exists() {
            warn!("{} not found - display hardware not present, continuing without a panel",
                settings.spi_bus);
            return Ok(None);
        }

        let panel = LinuxPanel::open(settings)?;
        info!("Created {} sink ({}x{})", settings.driver.name(), settings.width, settings.height);
        Ok(Some(Box::new(panel)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;

    fn settings(driver: DriverKind) -> PanelSettings {
        DisplayConfig { driver: Some(driver), ..Default::default() }.resolve().unwrap()
    }

    #[test]
    fn test_headless_gives_no_sink() {
        let mut s = settings(DriverKind::St7789);
        s.headless = true;
        assert!(SinkFactory::create_from_config(&s).unwrap().is_none());
    }

    #[test]
    fn test_no_panel_driver_gives_no_sink() {
        let s = settings(DriverKind::NoPanel);
        assert!(SinkFactory::create_from_config(&s).unwrap().is_none());
    }

    #[test]
    fn test_missing_bus_gives_no_sink() {
        let mut s = settings(DriverKind::St7789);
        s.spi_bus = "/nonexistent/spidev9.9".to_string();
        assert!(SinkFactory::create_from_config(&s).unwrap().is_none());
    }
}
