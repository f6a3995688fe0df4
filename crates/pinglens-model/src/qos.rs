use thiserror::Error;

const IPTOS_LOWDELAY: u8 = 0x10;
const IPTOS_THROUGHPUT: u8 = 0x08;
const IPTOS_RELIABILITY: u8 = 0x04;
const IPTOS_MINCOST: u8 = 0x02;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QosError {
    #[error("invalid QoS argument: \"{0}\"")]
    Invalid(String),
}

pub const QOS_HELP: &str = "\
Valid QoS arguments (option \"-Q\") are:

  Differentiated Services (IPv4 and IPv6, RFC 2474)

    be                     Best Effort (BE, default PHB).
    ef                     Expedited Forwarding (EF) PHB group (RFC 3246).
    va                     Voice Admit (VA) DSCP (RFC 5865).
    af[1-4][1-3]           Assured Forwarding (AF) PHB group (RFC 2597).
    cs[0-7]                Class Selector (CS) PHB group (RFC 2474).

  Type of Service (IPv4, RFC 1349, obsolete)

    lowdelay     (0x10)    minimize delay
    throughput   (0x08)    maximize throughput
    reliability  (0x04)    maximize reliability
    mincost      (0x02)    minimize monetary cost

  Specify manually

    0x00 - 0xff            Hexadecimal numeric specification.
       0 -  255            Decimal numeric specification.
";

/// Parses a QoS name or number into the value of the IP TOS / traffic class byte.
pub fn parse_qos(text: &str) -> Result<u8, QosError> {
    let lower = text.trim().to_ascii_lowercase();
    let invalid = || QosError::Invalid(text.to_string());

    match lower.as_str() {
        "be" => return Ok(0),
        "ef" => return Ok(0x2e << 2),
        "va" => return Ok(0x2c << 2),
        "lowdelay" => return Ok(IPTOS_LOWDELAY),
        "throughput" => return Ok(IPTOS_THROUGHPUT),
        "reliability" => return Ok(IPTOS_RELIABILITY),
        "mincost" => return Ok(IPTOS_MINCOST),
        _ => {}
    }

    let bytes = lower.as_bytes();
    if lower.starts_with("af") && bytes.len() == 4 {
        let class = match bytes[2] {
            b'1'..=b'4' => bytes[2] - b'0',
            _ => return Err(invalid()),
        };
        let precedence = match bytes[3] {
            b'1'..=b'3' => bytes[3] - b'0',
            _ => return Err(invalid()),
        };
        let dscp = 8 * class + 2 * precedence;
        return Ok(dscp << 2);
    }

    if lower.starts_with("cs") && bytes.len() == 3 {
        return match bytes[2] {
            b'0'..=b'7' => Ok((bytes[2] - b'0') << 5),
            _ => Err(invalid()),
        };
    }

    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else if lower.len() > 1 && lower.starts_with('0') {
        u32::from_str_radix(&lower[1..], 8)
    } else {
        lower.parse::<u32>()
    };

    match parsed {
        Ok(value) if value <= 0xff => Ok(value as u8),
        _ => Err(invalid()),
    }
}

pub fn format_qos(qos: u8) -> String {
    let dscp = qos >> 2;
    let ecn = match qos & 0x03 {
        0x01 => ",ecn(1)",
        0x02 => ",ecn(0)",
        0x03 => ",ce",
        _ => "",
    };

    let name = match dscp {
        0x00 => Some("be"),
        0x2e => Some("ef"),
        0x2c => Some("va"),
        0x0a => Some("af11"),
        0x0c => Some("af12"),
        0x0e => Some("af13"),
        0x12 => Some("af21"),
        0x14 => Some("af22"),
        0x16 => Some("af23"),
        0x1a => Some("af31"),
        0x1c => Some("af32"),
        0x1e => Some("af33"),
        0x22 => Some("af41"),
        0x24 => Some("af42"),
        0x26 => Some("af43"),
        0x08 => Some("cs1"),
        0x10 => Some("cs2"),
        0x18 => Some("cs3"),
        0x20 => Some("cs4"),
        0x28 => Some("cs5"),
        0x30 => Some("cs6"),
        0x38 => Some("cs7"),
        _ => None,
    };

    match name {
        Some(name) => format!("{name}{ecn}"),
        None => format!("0x{dscp:02x}{ecn}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_classes() {
        assert_eq!(parse_qos("be"), Ok(0));
        assert_eq!(parse_qos("EF"), Ok(0xb8));
        assert_eq!(parse_qos("va"), Ok(0xb0));
        assert_eq!(parse_qos("af12"), Ok(0x30));
        assert_eq!(parse_qos("af41"), Ok(0x88));
        assert_eq!(parse_qos("cs1"), Ok(0x20));
        assert_eq!(parse_qos("lowdelay"), Ok(IPTOS_LOWDELAY));
    }

    #[test]
    fn numeric_values() {
        assert_eq!(parse_qos("0x2e"), Ok(0x2e));
        assert_eq!(parse_qos("255"), Ok(255));
        assert_eq!(parse_qos("010"), Ok(8));
        assert!(parse_qos("256").is_err());
        assert!(parse_qos("af51").is_err());
        assert!(parse_qos("cs8").is_err());
        assert!(parse_qos("fast").is_err());
    }

    #[test]
    fn formatting_names_and_ecn() {
        assert_eq!(format_qos(0), "be");
        assert_eq!(format_qos(0xb8), "ef");
        assert_eq!(format_qos(0x30 | 0x01), "af12,ecn(1)");
        assert_eq!(format_qos(0x03), "be,ce");
        assert_eq!(format_qos(0x04), "0x01");
    }

    #[test]
    fn voice_admit_round_trips() {
        let qos = parse_qos("va").unwrap();
        assert_eq!(qos, 0xb0);
        assert_eq!(format_qos(qos), "va");
        assert_eq!(format_qos(qos | 0x03), "va,ce");
        assert_eq!(format_qos(0xb4), "0x2d");
    }
}
