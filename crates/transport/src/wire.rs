//! Wire format: length-prefixed bincode frames, optionally gzip-compressed.
//!
//! Frame layout: `[len: u32 BE][flags: u8][payload]` where `len` covers the
//! flags byte plus payload. Flag bit 0 marks a gzip body.

use std::io::{Read, Write};

use contracts::{PipelineError, PipelineUpdate, SensorReading};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single frame body; anything larger is a protocol error
const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

const FLAG_GZIP: u8 = 0b0000_0001;

/// One message on the stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Envelope {
    /// Raw readings from the garment edge layer
    Samples(Vec<SensorReading>),

    /// Processed result flowing out
    Update(Box<PipelineUpdate>),

    /// Liveness probe
    Heartbeat { seq: u64 },

    /// Liveness reply
    HeartbeatAck { seq: u64 },
}

/// Frame encoder/decoder
#[derive(Debug, Clone, Copy)]
pub struct FrameCodec {
    compression: bool,
}

impl FrameCodec {
    /// Create a codec; `compression` gzips outbound bodies
    pub fn new(compression: bool) -> Self {
        Self { compression }
    }

    /// Encode an envelope into a full frame (length prefix included)
    pub fn encode(&self, envelope: &Envelope) -> Result<Vec<u8>, PipelineError> {
        let body = bincode::serialize(envelope).map_err(|e| PipelineError::TransportSend {
            message: format!("encode error: {e}"),
        })?;

        let (flags, body) = if self.compression {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
            encoder
                .write_all(&body)
                .and_then(|_| encoder.finish())
                .map(|compressed| (FLAG_GZIP, compressed))
                .map_err(|e| PipelineError::TransportSend {
                    message: format!("compress error: {e}"),
                })?
        } else {
            (0, body)
        };

        let len = body.len() as u32 + 1;
        let mut frame = Vec::with_capacity(body.len() + 5);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.push(flags);
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Decode a frame body (flags byte plus payload, length prefix stripped)
    pub fn decode(&self, body: &[u8]) -> Result<Envelope, PipelineError> {
        let (&flags, payload) = body.split_first().ok_or_else(|| PipelineError::TransportSend {
            message: "empty frame".to_string(),
        })?;

        let raw;
        let payload: &[u8] = if flags & FLAG_GZIP != 0 {
            let mut decoder = GzDecoder::new(payload);
            let mut buf = Vec::new();
            decoder
                .read_to_end(&mut buf)
                .map_err(|e| PipelineError::TransportSend {
                    message: format!("decompress error: {e}"),
                })?;
            raw = buf;
            &raw
        } else {
            payload
        };

        bincode::deserialize(payload).map_err(|e| PipelineError::TransportSend {
            message: format!("decode error: {e}"),
        })
    }

    /// Write one envelope to an async stream
    pub async fn write_frame<W: AsyncWrite + Unpin>(
        &self,
        writer: &mut W,
        envelope: &Envelope,
    ) -> Result<(), PipelineError> {
        let frame = self.encode(envelope)?;
        writer.write_all(&frame).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Read one envelope from an async stream
    pub async fn read_frame<R: AsyncRead + Unpin>(
        &self,
        reader: &mut R,
    ) -> Result<Envelope, PipelineError> {
        let len = reader.read_u32().await?;
        if len == 0 || len > MAX_FRAME_BYTES {
            return Err(PipelineError::TransportSend {
                message: format!("bad frame length: {len}"),
            });
        }

        let mut body = vec![0u8; len as usize];
        reader.read_exact(&mut body).await?;
        self.decode(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{SensorChannel, WindowMetrics};

    fn sample_envelope() -> Envelope {
        Envelope::Samples(vec![SensorReading {
            sensor_id: "pelvis_imu".into(),
            channel: SensorChannel::Imu,
            timestamp: 1.25,
            raw_values: vec![0.1, -0.2, 9.8, 0.0, 0.0, 0.0],
            quality_score: 92,
        }])
    }

    #[test]
    fn test_round_trip_uncompressed() {
        let codec = FrameCodec::new(false);
        let frame = codec.encode(&sample_envelope()).unwrap();
        let decoded = codec.decode(&frame[4..]).unwrap();

        match decoded {
            Envelope::Samples(readings) => {
                assert_eq!(readings.len(), 1);
                assert_eq!(readings[0].sensor_id, "pelvis_imu");
            }
            other => panic!("wrong envelope: {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_compressed() {
        let codec = FrameCodec::new(true);
        let frame = codec.encode(&sample_envelope()).unwrap();
        assert_eq!(frame[4] & FLAG_GZIP, FLAG_GZIP);

        let decoded = codec.decode(&frame[4..]).unwrap();
        assert!(matches!(decoded, Envelope::Samples(_)));
    }

    #[test]
    fn test_compression_shrinks_repetitive_payloads() {
        // A batch of near-identical readings compresses far below 1:1; the
        // target ratio on real sample batches is around 10:1
        let readings: Vec<SensorReading> = (0..256)
            .map(|i| SensorReading {
                sensor_id: "pelvis_imu".into(),
                channel: SensorChannel::Imu,
                timestamp: i as f64 * 0.005,
                raw_values: vec![0.0, 0.0, 9.8, 0.0, 0.0, 0.0],
                quality_score: 95,
            })
            .collect();
        let envelope = Envelope::Samples(readings);

        let plain = FrameCodec::new(false).encode(&envelope).unwrap();
        let compressed = FrameCodec::new(true).encode(&envelope).unwrap();
        assert!(
            compressed.len() * 5 < plain.len(),
            "gzip {} vs plain {}",
            compressed.len(),
            plain.len()
        );
    }

    #[test]
    fn test_update_envelope_round_trip() {
        let codec = FrameCodec::new(true);
        let envelope = Envelope::Update(Box::new(PipelineUpdate::Metrics(WindowMetrics::new(
            "quad_left_tof".into(),
            2.0,
        ))));
        let frame = codec.encode(&envelope).unwrap();
        assert!(matches!(
            codec.decode(&frame[4..]).unwrap(),
            Envelope::Update(_)
        ));
    }

    #[tokio::test]
    async fn test_stream_read_write() {
        let codec = FrameCodec::new(true);
        let mut buf = std::io::Cursor::new(Vec::new());
        codec
            .write_frame(&mut buf, &Envelope::Heartbeat { seq: 7 })
            .await
            .unwrap();

        let mut reader = std::io::Cursor::new(buf.into_inner());
        let decoded = codec.read_frame(&mut reader).await.unwrap();
        assert!(matches!(decoded, Envelope::Heartbeat { seq: 7 }));
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let codec = FrameCodec::new(false);
        let mut frame = Vec::new();
        frame.extend_from_slice(&(MAX_FRAME_BYTES + 1).to_be_bytes());
        frame.push(0);

        let mut reader = std::io::Cursor::new(frame);
        let result = futures_block_on(codec.read_frame(&mut reader));
        assert!(result.is_err());
    }

    /// Minimal block_on for the one sync test that needs an async call
    fn futures_block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }
}
