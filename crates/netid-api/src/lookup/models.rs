// XML response model for the lookup API.
//
// The API answers with a flat-ish document; the elements we care about are
// located by name wherever they appear, first occurrence wins. Element
// text is taken verbatim, surrounding whitespace included:
//
//   <response>
//     <message>ok</message>
//     <MCC_MNC>24001</MCC_MNC>
//     <VLR_address>46705000000</VLR_address>
//   </response>

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::Error;

/// Value of the `message` element on a successful lookup.
pub const STATUS_OK: &str = "ok";

const MESSAGE_TAG: &[u8] = b"message";
const NETWORK_ID_TAG: &[u8] = b"MCC_MNC";
const VLR_ADDRESS_TAG: &[u8] = b"VLR_address";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Message,
    NetworkId,
    VlrAddress,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            MESSAGE_TAG => Some(Self::Message),
            NETWORK_ID_TAG => Some(Self::NetworkId),
            VLR_ADDRESS_TAG => Some(Self::VlrAddress),
            _ => None,
        }
    }
}

/// Parsed lookup response.
///
/// `network_id` is guaranteed present when `status == "ok"`. The raw body
/// is kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    /// Contents of the `message` element.
    pub status: String,
    /// Contents of the `MCC_MNC` element.
    pub network_id: Option<String>,
    /// Contents of the `VLR_address` element, used only in diagnostics.
    pub vlr_address: Option<String>,
    /// The full response body.
    pub raw: String,
}

impl LookupResponse {
    /// Whether the API reported success.
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Parse an XML response body.
    ///
    /// Fails if the document is malformed, lacks a `message` element, or
    /// reports success without an `MCC_MNC` element.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let malformed = |message: String| Error::Deserialization {
            message,
            body: body.to_owned(),
        };

        let mut reader = Reader::from_str(body);

        let mut status: Option<String> = None;
        let mut network_id: Option<String> = None;
        let mut vlr_address: Option<String> = None;
        let mut current: Option<Field> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| malformed(format!("invalid XML: {e}")))?;

            match event {
                Event::Start(start) => {
                    current = Field::from_tag(start.local_name().as_ref());
                }
                Event::Empty(empty) => {
                    if let Some(field) = Field::from_tag(empty.local_name().as_ref()) {
                        let slot = slot_for(field, &mut status, &mut network_id, &mut vlr_address);
                        slot.get_or_insert_with(String::new);
                    }
                }
                Event::Text(text) => {
                    if let Some(field) = current {
                        let value = text
                            .unescape()
                            .map_err(|e| malformed(format!("invalid XML text: {e}")))?;
                        let slot = slot_for(field, &mut status, &mut network_id, &mut vlr_address);
                        if slot.is_none() {
                            *slot = Some(value.into_owned());
                        }
                    }
                }
                Event::CData(cdata) => {
                    if let Some(field) = current {
                        let value = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                        let slot = slot_for(field, &mut status, &mut network_id, &mut vlr_address);
                        if slot.is_none() {
                            *slot = Some(value);
                        }
                    }
                }
                Event::End(_) => current = None,
                Event::Eof => break,
                _ => {}
            }
        }

        let status = status.ok_or_else(|| malformed("missing <message> element".into()))?;

        let network_id = network_id.filter(|id| !id.is_empty());
        if status == STATUS_OK && network_id.is_none() {
            return Err(malformed("status ok but no <MCC_MNC> element".into()));
        }

        Ok(Self {
            status,
            network_id,
            vlr_address,
            raw: body.to_owned(),
        })
    }
}

fn slot_for<'a>(
    field: Field,
    status: &'a mut Option<String>,
    network_id: &'a mut Option<String>,
    vlr_address: &'a mut Option<String>,
) -> &'a mut Option<String> {
    match field {
        Field::Message => status,
        Field::NetworkId => network_id,
        Field::VlrAddress => vlr_address,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_successful_lookup() {
        let body = "<response><message>ok</message><MCC_MNC>24001</MCC_MNC>\
                    <VLR_address>46705000000</VLR_address></response>";
        let resp = LookupResponse::parse(body).unwrap();

        assert!(resp.is_ok());
        assert_eq!(resp.network_id.as_deref(), Some("24001"));
        assert_eq!(resp.vlr_address.as_deref(), Some("46705000000"));
        assert_eq!(resp.raw, body);
    }

    #[test]
    fn elements_are_found_at_any_depth() {
        let body = r#"<?xml version="1.0"?>
            <envelope>
              <status><message>ok</message></status>
              <result><subscriber><MCC_MNC>23410</MCC_MNC></subscriber></result>
            </envelope>"#;
        let resp = LookupResponse::parse(body).unwrap();

        assert_eq!(resp.network_id.as_deref(), Some("23410"));
        assert!(resp.vlr_address.is_none());
    }

    #[test]
    fn padded_status_is_not_ok() {
        let body = "<response><message> ok </message><MCC_MNC>24001</MCC_MNC></response>";
        let resp = LookupResponse::parse(body).unwrap();

        assert_eq!(resp.status, " ok ");
        assert!(!resp.is_ok());
    }

    #[test]
    fn indentation_between_elements_is_ignored() {
        let body = "<response>\n  <message>ok</message>\n  <MCC_MNC>24001</MCC_MNC>\n</response>\n";
        let resp = LookupResponse::parse(body).unwrap();

        assert!(resp.is_ok());
        assert_eq!(resp.network_id.as_deref(), Some("24001"));
    }

    #[test]
    fn first_occurrence_wins() {
        let body = "<r><message>ok</message><MCC_MNC>24001</MCC_MNC><MCC_MNC>24002</MCC_MNC></r>";
        let resp = LookupResponse::parse(body).unwrap();
        assert_eq!(resp.network_id.as_deref(), Some("24001"));
    }

    #[test]
    fn non_ok_status_is_returned_not_rejected() {
        let body = "<response><message>subscriber unknown</message></response>";
        let resp = LookupResponse::parse(body).unwrap();

        assert!(!resp.is_ok());
        assert_eq!(resp.status, "subscriber unknown");
        assert!(resp.network_id.is_none());
    }

    #[test]
    fn escaped_text_is_unescaped() {
        let body = "<r><message>quota &amp; limits</message></r>";
        let resp = LookupResponse::parse(body).unwrap();
        assert_eq!(resp.status, "quota & limits");
    }

    #[test]
    fn missing_message_is_malformed() {
        let err = LookupResponse::parse("<r><MCC_MNC>24001</MCC_MNC></r>").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }), "got {err:?}");
    }

    #[test]
    fn ok_without_network_id_is_malformed() {
        let err = LookupResponse::parse("<r><message>ok</message><MCC_MNC/></r>").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }), "got {err:?}");
    }

    #[test]
    fn broken_xml_is_malformed() {
        let err = LookupResponse::parse("<r><message>ok</other></r>").unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert_eq!(body, "<r><message>ok</other></r>"),
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }
}
