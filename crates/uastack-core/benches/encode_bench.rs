use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use uastack_core::channel::{ChannelParameters, ChannelSecurity, SecureChannel, SecuritySecrets};
use uastack_core::constants::{ChunkFinality, MessageType};
use uastack_core::encoder::ChunkEncoder;
use uastack_core::headers::SecureMessageHeader;
use uastack_core::policy::{MessageSecurityMode, SecurityPolicy};

fn channel(mode: MessageSecurityMode) -> SecureChannel {
    let mut channel = SecureChannel::new(1, SecurityPolicy::Basic256Sha256, mode);
    channel.security = Some(ChannelSecurity {
        token_id: 1,
        keys: SecuritySecrets {
            signature_key: vec![0x11; 32],
            encryption_key: vec![0x22; 32],
            initialization_vector: vec![0x33; 16],
        },
    });
    channel
}

fn bench_symmetric_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_symmetric");

    let sign_channel = channel(MessageSecurityMode::Sign);
    let encrypt_channel = channel(MessageSecurityMode::SignAndEncrypt);
    let parameters = ChannelParameters::new(8192);

    for size in [256usize, 4096, 65536] {
        let payload = vec![0xAB; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("sign", size), &payload, |b, payload| {
            let mut encoder = ChunkEncoder::new(parameters);
            b.iter(|| {
                encoder
                    .encode_symmetric(&sign_channel, MessageType::Message, payload, 1)
                    .unwrap()
            });
        });

        group.bench_with_input(
            BenchmarkId::new("sign_and_encrypt", size),
            &payload,
            |b, payload| {
                let mut encoder = ChunkEncoder::new(parameters);
                b.iter(|| {
                    encoder
                        .encode_symmetric(&encrypt_channel, MessageType::Message, payload, 1)
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_header_encode(c: &mut Criterion) {
    let header = SecureMessageHeader {
        message_type: MessageType::Message,
        finality: ChunkFinality::Final,
        chunk_length: 8192,
        channel_id: 42,
    };

    c.bench_function("secure_message_header_encode", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(SecureMessageHeader::SIZE);
            header.encode(&mut out);
            out
        });
    });
}

criterion_group!(benches, bench_symmetric_encode, bench_header_encode);
criterion_main!(benches);
