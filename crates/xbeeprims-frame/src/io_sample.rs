//! Bit-field and fixed-point decoders: I/O samples, legacy 16-bit I/O
//! samples and 1-Wire sensor readings.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::message::{IoSample, LegacyIoSample, SensorValues};
use crate::parser::{Cursor, DecodeOptions};

/// Digital channel names keyed by mask bit.
const DIGITAL_CHANNELS: [(u8, &str); 11] = [
    (0, "DIO0"),
    (1, "DIO1"),
    (2, "DIO2"),
    (3, "DIO3"),
    (4, "DIO4"),
    (5, "DIO5"),
    (6, "DIO6"),
    (7, "DIO7"),
    (10, "DIO10"),
    (11, "DIO11"),
    (12, "DIO12"),
];

/// Analog channel names keyed by mask bit.
const ANALOG_CHANNELS: [(u8, &str); 5] = [
    (0, "AD0"),
    (1, "AD1"),
    (2, "AD2"),
    (3, "AD3"),
    (7, "SUPPLY"),
];

/// Legacy masks: DIO0..DIO8 on bits 0..8, ADC0..ADC5 on bits 9..14.
const LEGACY_DIGITAL_MASK: u16 = 0x01FF;
const LEGACY_ANALOG_SHIFT: u32 = 9;

/// Sensor adapter bit flags.
const SENSOR_HUMIDITY: u8 = 0x01;
const SENSOR_TEMPERATURE: u8 = 0x02;
const SENSOR_WATER_PRESENT: u8 = 0x60;

fn bit_set(mask: u16, bit: u8) -> bool {
    mask & (1 << bit) != 0
}

/// Scale a raw ADC count to millivolts against `vref_mv`.
pub fn adc_to_millivolts(raw: u16, vref_mv: u32) -> u32 {
    (f64::from(raw) * f64::from(vref_mv) / 1023.0).round() as u32
}

pub(crate) fn parse_io_sample(cur: &mut Cursor<'_>, options: &DecodeOptions) -> Result<IoSample> {
    let num_samples = cur.u8()?;
    let digital_mask = cur.u16()?;
    let analog_mask = u16::from(cur.u8()?);

    let mut digital_samples = BTreeMap::new();
    if digital_mask > 0 {
        // One word carries every enabled digital line.
        let word = cur.u16()?;
        for (bit, name) in DIGITAL_CHANNELS {
            if bit_set(digital_mask, bit) {
                digital_samples.insert(name.to_string(), u8::from(bit_set(word, bit)));
            }
        }
    }

    let mut analog_samples = BTreeMap::new();
    for (bit, name) in ANALOG_CHANNELS {
        if bit_set(analog_mask, bit) {
            let raw = cur.u16()?;
            let value = if options.convert_adc {
                adc_to_millivolts(raw, options.vref_adc)
            } else {
                u32::from(raw)
            };
            analog_samples.insert(name.to_string(), value);
        }
    }

    Ok(IoSample {
        num_samples,
        digital_samples,
        analog_samples,
    })
}

pub(crate) fn parse_legacy_io_sample(cur: &mut Cursor<'_>) -> Result<LegacyIoSample> {
    let sample_quantity = cur.u8()?;
    let channel_mask = cur.u16()?;

    let adc_enabled: Vec<u8> = (0..=5)
        .filter(|n| channel_mask & (1 << (LEGACY_ANALOG_SHIFT + u32::from(*n))) != 0)
        .collect();
    let mut channels: Vec<String> = adc_enabled.iter().map(|n| format!("ADC{n}")).collect();

    let mut digital_samples = Vec::new();
    if channel_mask & LEGACY_DIGITAL_MASK != 0 {
        for _ in 0..sample_quantity {
            digital_samples.push(cur.u16()?);
        }
        channels.extend(
            (0..=8u8)
                .filter(|bit| bit_set(channel_mask, *bit))
                .map(|bit| format!("DIO{bit}")),
        );
    }

    let mut analog_samples = Vec::with_capacity(usize::from(sample_quantity));
    for _ in 0..sample_quantity {
        let mut sample = BTreeMap::new();
        for n in &adc_enabled {
            sample.insert(format!("ADC{n}"), cur.u16()?);
        }
        analog_samples.push(sample);
    }

    Ok(LegacyIoSample {
        sample_quantity,
        channel_mask,
        channels,
        digital_samples,
        analog_samples,
    })
}

fn sensor_millivolts(raw: u16) -> u32 {
    (1000.0 * (f64::from(raw) * 5.1) / 255.0).round() as u32
}

/// Temperature in degrees Celsius from the 12-bit sign-magnitude reading.
pub fn sensor_temperature(raw: u16) -> f64 {
    if raw < 2048 {
        f64::from(raw) / 16.0
    } else {
        -f64::from(raw & 0x7FF) / 16.0
    }
}

fn round_hundredths(value: f64) -> f64 {
    (100.0 * value).round() / 100.0
}

pub(crate) fn parse_sensor_values(cur: &mut Cursor<'_>, sensors: u8) -> Result<SensorValues> {
    let ad0 = sensor_millivolts(cur.u16()?);
    let ad1 = sensor_millivolts(cur.u16()?);
    let ad2 = sensor_millivolts(cur.u16()?);
    let ad3 = sensor_millivolts(cur.u16()?);
    let temperature_raw = cur.u16()?;

    let temperature =
        (sensors & SENSOR_TEMPERATURE != 0).then(|| sensor_temperature(temperature_raw));
    let relative_humidity = (sensors & SENSOR_HUMIDITY != 0)
        .then(|| round_hundredths((f64::from(ad3) / f64::from(ad2) - 0.16) / 0.0062));
    let true_humidity = match (relative_humidity, temperature) {
        (Some(rh), Some(temp)) => Some(round_hundredths(rh / (1.0546 - 0.00216 * temp))),
        _ => None,
    };

    Ok(SensorValues {
        ad0,
        ad1,
        ad2,
        ad3,
        temperature_raw,
        temperature,
        relative_humidity,
        true_humidity,
        water_present: sensors == SENSOR_WATER_PRESENT,
    })
}
