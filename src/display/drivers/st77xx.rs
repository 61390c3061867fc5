/*
 *  display/drivers/st77xx.rs
 *
 *  robot-face - expressive eyes for small SPI panels
 *  (c) 2026 robot-face contributors
 *
 *  ST7789 / ST7735S TFT sink over embedded-hal SPI + GPIO
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

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::sysfs_gpio::Direction;
use linux_embedded_hal::{Delay, SpidevDevice, SysfsPin};
use log::{debug, info};

use crate::config::{DriverKind, PanelSettings};
use crate::display::canvas::Frame;
use crate::display::error::DisplayError;
use crate::display::traits::{CanvasSink, SinkCapabilities};

// MIPI DCS commands used by both controllers
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL bits
const MADCTL_MY: u8 = 0x80;
const MADCTL_MX: u8 = 0x40;
const MADCTL_MV: u8 = 0x20;
const MADCTL_BGR: u8 = 0x08;

/// spidev refuses single transfers above its default buffer size
pub const MAX_TRANSFER: usize = 4096;

/// ST7789 RAM is 240x320 regardless of the glass fitted
const ST7789_RAM_HEIGHT: u32 = 320;

/// Controller family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Controller {
    St7789,
    St7735,
}

impl Controller {
    fn name(&self) -> &'static str {
        match self {
            Controller::St7789 => "ST7789",
            Controller::St7735 => "ST7735S",
        }
    }
}

/// TFT panel driven over a 4-wire SPI bus
///
/// Frames are converted to RGB565 and streamed in `MAX_TRANSFER` chunks.
/// Chip select belongs to the `SpiDevice`.
pub struct St77xxSink<SPI, DC, RST, BL, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    backlight: Option<BL>,
    delay: D,
    controller: Controller,
    rotation: u16,
    offset: (u16, u16),
    capabilities: SinkCapabilities,
    scratch: Vec<u8>,
}

impl<SPI, DC, RST, BL, D> St77xxSink<SPI, DC, RST, BL, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
    D: DelayNs,
{
    /// Wrap already-configured bus and pins; nothing is sent until `init`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spi: SPI,
        dc: DC,
        rst: RST,
        backlight: Option<BL>,
        delay: D,
        controller: Controller,
        width: u32,
        height: u32,
        rotation: u16,
    ) -> Result<Self, DisplayError> {
        if !matches!(rotation, 0 | 90 | 180 | 270) {
            return Err(DisplayError::InvalidRotation(rotation));
        }
        if width == 0 || height == 0 || width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(DisplayError::InvalidConfiguration(
                format!("panel size {}x{} not addressable", width, height)
            ));
        }

        let capabilities = SinkCapabilities {
            width,
            height,
            name: controller.name(),
            supports_backlight: backlight.is_some(),
        };

        Ok(Self {
            spi,
            dc,
            rst,
            backlight,
            delay,
            controller,
            rotation,
            offset: ram_offset(controller, width, height, rotation),
            capabilities,
            scratch: Vec::with_capacity(MAX_TRANSFER),
        })
    }

    fn command(&mut self, cmd: u8, args: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(gpio_err)?;
        self.spi.write(&[cmd]).map_err(spi_err)?;
        if !args.is_empty() {
            self.dc.set_high().map_err(gpio_err)?;
            self.spi.write(args).map_err(spi_err)?;
        }
        Ok(())
    }

    fn madctl(&self) -> u8 {
        let orient = match self.rotation {
            90 => MADCTL_MX | MADCTL_MV,
            180 => MADCTL_MX | MADCTL_MY,
            270 => MADCTL_MY | MADCTL_MV,
            _ => 0,
        };
        match self.controller {
            Controller::St7789 => orient,
            Controller::St7735 => orient | MADCTL_BGR,
        }
    }

    fn set_window(&mut self, x1: u16, y1: u16) -> Result<(), DisplayError> {
        let (ox, oy) = self.offset;
        let (xs, xe) = (ox, ox + x1);
        let (ys, ye) = (oy, oy + y1);
        self.command(CASET, &[(xs >> 8) as u8, xs as u8, (xe >> 8) as u8, xe as u8])?;
        self.command(RASET, &[(ys >> 8) as u8, ys as u8, (ye >> 8) as u8, ye as u8])?;
        self.command(RAMWR, &[])
    }

    fn hard_reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(gpio_err)?;
        self.delay.delay_ms(10);
        self.rst.set_low().map_err(gpio_err)?;
        self.delay.delay_ms(10);
        self.rst.set_high().map_err(gpio_err)?;
        self.delay.delay_ms(120);
        Ok(())
    }
}

impl<SPI, DC, RST, BL, D> CanvasSink for St77xxSink<SPI, DC, RST, BL, D>
where
    SPI: SpiDevice + Send,
    DC: OutputPin + Send,
    RST: OutputPin + Send,
    BL: OutputPin + Send,
    D: DelayNs + Send,
{
    fn capabilities(&self) -> &SinkCapabilities {
        &self.capabilities
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.hard_reset()?;

        self.command(SWRESET, &[])?;
        self.delay.delay_ms(150);
        self.command(SLPOUT, &[])?;
        self.delay.delay_ms(120);

        // 16 bits per pixel
        let colmod = match self.controller {
            Controller::St7789 => 0x55,
            Controller::St7735 => 0x05,
        };
        self.command(COLMOD, &[colmod])?;
        self.command(MADCTL, &[self.madctl()])?;
        if self.controller == Controller::St7789 {
            // IPS glass is inverted
            self.command(INVON, &[])?;
        }
        self.command(NORON, &[])?;
        self.delay.delay_ms(10);
        self.command(DISPON, &[])?;
        self.delay.delay_ms(100);

        if self.backlight.is_some() {
            self.set_backlight(true)?;
        }

        info!("{} initialized ({}x{}, rotation {})",
            self.capabilities.name, self.capabilities.width, self.capabilities.height, self.rotation);
        Ok(())
    }

    fn write_frame(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        self.check_frame(frame)?;

        let x1 = (frame.width() - 1) as u16;
        let y1 = (frame.height() - 1) as u16;
        self.set_window(x1, y1)?;
        self.dc.set_high().map_err(gpio_err)?;

        // MAX_TRANSFER is even so a pixel never straddles two chunks
        for px in frame.as_bytes().chunks(MAX_TRANSFER / 2 * 3) {
            self.scratch.clear();
            for rgb in px.chunks_exact(3) {
                self.scratch.extend_from_slice(&rgb565(rgb[0], rgb[1], rgb[2]).to_be_bytes());
            }
            self.spi.write(&self.scratch).map_err(spi_err)?;
        }

        debug!("{} frame sent", self.capabilities.name);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), DisplayError> {
        let pin = self.backlight.as_mut().ok_or(DisplayError::UnsupportedOperation)?;
        if on { pin.set_high() } else { pin.set_low() }.map_err(gpio_err)
    }
}

/// Sink on a Raspberry Pi: spidev for the bus, sysfs GPIO for the pins
pub type LinuxPanel = St77xxSink<SpidevDevice, SysfsPin, SysfsPin, SysfsPin, Delay>;

impl LinuxPanel {
    /// Open the bus and pins named in `settings`
    pub fn open(settings: &PanelSettings) -> Result<Self, DisplayError> {
        let controller = match settings.driver {
            DriverKind::St7789 => Controller::St7789,
            DriverKind::St7735 => Controller::St7735,
            DriverKind::NoPanel => {
                return Err(DisplayError::InvalidConfiguration("no panel configured".to_string()))
            }
        };

        info!("Opening {} on {} (DC={}, RST={}, BL={:?}, {} Hz)",
            controller.name(), settings.spi_bus, settings.pins.dc, settings.pins.reset,
            settings.pins.backlight, settings.speed_hz);

        let mut spi = SpidevDevice::open(&settings.spi_bus).map_err(|e| {
            DisplayError::InitializationFailed(format!("open {}: {:?}", settings.spi_bus, e))
        })?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(settings.speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).map_err(|e| {
            DisplayError::InitializationFailed(format!("configure {}: {:?}", settings.spi_bus, e))
        })?;

        let dc = output_pin(settings.pins.dc)?;
        let rst = output_pin(settings.pins.reset)?;
        let backlight = settings.pins.backlight.map(output_pin).transpose()?;

        Self::new(
            spi,
            dc,
            rst,
            backlight,
            Delay,
            controller,
            settings.width,
            settings.height,
            settings.rotation,
        )
    }
}

fn output_pin(bcm: u32) -> Result<SysfsPin, DisplayError> {
    let pin = SysfsPin::new(bcm as u64);
    pin.export()
        .map_err(|e| DisplayError::GpioError(format!("export GPIO{}: {:?}", bcm, e)))?;
    pin.set_direction(Direction::Out)
        .map_err(|e| DisplayError::GpioError(format!("GPIO{} as output: {:?}", bcm, e)))?;
    Ok(pin)
}

/// Column/row where the visible glass starts inside controller RAM
fn ram_offset(controller: Controller, width: u32, height: u32, rotation: u16) -> (u16, u16) {
    if controller != Controller::St7789 {
        return (0, 0);
    }
    // short panels sit at the top of RAM; flipping moves them to the bottom
    let native_height = if rotation == 90 || rotation == 270 { width } else { height };
    let gap = ST7789_RAM_HEIGHT.saturating_sub(native_height) as u16;
    match rotation {
        180 => (0, gap),
        270 => (gap, 0),
        _ => (0, 0),
    }
}

fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

fn spi_err<E: core::fmt::Debug>(e: E) -> DisplayError {
    DisplayError::SpiError(format!("{:?}", e))
}

fn gpio_err<E: core::fmt::Debug>(e: E) -> DisplayError {
    DisplayError::GpioError(format!("{:?}", e))
}
