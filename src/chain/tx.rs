use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::{BlockHeight, Coin};
use crate::encdec::{DecodingError, Field, Message};

/// A transaction from a block body, decoded out of its `TxRaw` envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecodedTx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    #[serde(serialize_with = "base64_list")]
    pub signatures: Vec<Vec<u8>>,
}

impl DecodedTx {
    pub fn message_types(&self) -> Vec<&str> {
        self.body
            .messages
            .iter()
            .map(|m| m.type_url.as_str())
            .collect()
    }
}

/// Transaction as it appears in a recent block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxRecord {
    pub height: BlockHeight,
    pub hash: String,
    pub tx: DecodedTx,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TxBody {
    pub messages: Vec<Any>,
    pub memo: String,
    pub timeout_height: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Any {
    pub type_url: String,
    #[serde(serialize_with = "base64_bytes")]
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Option<Fee>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignerInfo {
    pub public_key: Option<Any>,
    pub sequence: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fee {
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
    pub payer: String,
    pub granter: String,
}

#[derive(Debug, Default)]
struct TxRaw {
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
    signatures: Vec<Vec<u8>>,
}

impl Message for TxRaw {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
        match field.number {
            1 => self.body_bytes = field.bytes()?.to_vec(),
            2 => self.auth_info_bytes = field.bytes()?.to_vec(),
            3 => self.signatures.push(field.bytes()?.to_vec()),
            _ => {}
        }
        Ok(())
    }
}

impl Message for TxBody {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
        // 1023/2047 are extension options, which we do not surface
        match field.number {
            1 => self.messages.push(field.message()?),
            2 => self.memo = field.string()?,
            3 => self.timeout_height = field.uint64()?,
            _ => {}
        }
        Ok(())
    }
}

impl Message for Any {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
        match field.number {
            1 => self.type_url = field.string()?,
            2 => self.value = field.bytes()?.to_vec(),
            _ => {}
        }
        Ok(())
    }
}

impl Message for AuthInfo {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
        match field.number {
            1 => self.signer_infos.push(field.message()?),
            2 => self.fee = Some(field.message()?),
            _ => {}
        }
        Ok(())
    }
}

impl Message for SignerInfo {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
        // 2 is mode_info
        match field.number {
            1 => self.public_key = Some(field.message()?),
            3 => self.sequence = field.uint64()?,
            _ => {}
        }
        Ok(())
    }
}

impl Message for Fee {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
        match field.number {
            1 => self.amount.push(field.message()?),
            2 => self.gas_limit = field.uint64()?,
            3 => self.payer = field.string()?,
            4 => self.granter = field.string()?,
            _ => {}
        }
        Ok(())
    }
}

impl Message for Coin {
    fn merge_field(&mut self, field: Field<'_>) -> Result<(), DecodingError> {
        match field.number {
            1 => self.denom = field.string()?,
            2 => self.amount = field.string()?,
            _ => {}
        }
        Ok(())
    }
}

/// Decode `TxRaw` bytes, including the nested body and auth info
pub fn decode_tx(raw: &[u8]) -> Result<DecodedTx, DecodingError> {
    let envelope = TxRaw::decode_message(raw)?;

    Ok(DecodedTx {
        body: TxBody::decode_message(&envelope.body_bytes)?,
        auth_info: AuthInfo::decode_message(&envelope.auth_info_bytes)?,
        signatures: envelope.signatures,
    })
}

pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, DecodingError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| DecodingError::InvalidBase64(e.to_string()))
}

/// Tendermint transaction hash: upper-case hex SHA-256 of the raw bytes
pub fn hash_tx(raw: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(raw))
}

/// Decode one base64 block entry into a record at `height`
pub fn decode_record(height: BlockHeight, encoded: &str) -> Result<TxRecord, DecodingError> {
    let raw = decode_base64(encoded)?;

    Ok(TxRecord {
        height,
        hash: hash_tx(&raw),
        tx: decode_tx(&raw)?,
    })
}

fn base64_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn base64_list<S: Serializer>(list: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(list.iter().map(|b| STANDARD.encode(b)))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn decodes_full_transaction() {
        let tx = decode_tx(&raw_tx("hello")).unwrap();

        assert_eq!(tx.body.memo, "hello");
        assert_eq!(tx.body.timeout_height, 9);
        assert_eq!(tx.message_types(), vec!["/cosmos.bank.v1beta1.MsgSend"]);
        assert_eq!(tx.body.messages[0].value, vec![0x0a, 0x01, b'a']);

        let fee = tx.auth_info.fee.as_ref().unwrap();
        assert_eq!(fee.gas_limit, 200_000);
        assert_eq!(
            fee.amount,
            vec![Coin {
                denom: "aepix".into(),
                amount: "2500".into()
            }]
        );
        assert_eq!(tx.auth_info.signer_infos[0].sequence, 42);
        assert_eq!(tx.signatures, vec![vec![0xde, 0xad]]);
    }

    #[test]
    fn hashes_raw_bytes() {
        // sha256("")
        assert_eq!(
            hash_tx(b""),
            "E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855"
        );
    }

    #[test]
    fn record_carries_height_and_hash() {
        let record = decode_record(12, &encoded_tx("m")).unwrap();

        assert_eq!(record.height, 12);
        assert_eq!(record.hash, hash_tx(&raw_tx("m")));
        assert_eq!(record.tx.body.memo, "m");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            decode_record(1, "%%%not base64").unwrap_err(),
            DecodingError::InvalidBase64(_)
        ));
        assert!(decode_record(1, &malformed_tx()).is_err());
    }

    #[test]
    fn serializes_bytes_as_base64() {
        let tx = decode_tx(&raw_tx("")).unwrap();
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["signatures"][0], "3q0=");
        assert_eq!(json["body"]["messages"][0]["value"], "CgFh");
    }
}
