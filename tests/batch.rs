use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use transducer::gen_transducer;
use transducer::io::{parse_records, AlignRecord, DecodeRecord};

fn to_rows(trans: &transducer::Transducer) -> Vec<Vec<f64>> {
    trans.rows().iter().map(|row| row.to_vec()).collect()
}

#[test]
fn align_batch_skips_broken_reads() {
    let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(1290);
    let prof = &gen_transducer::NOISELESS;
    let config = transducer::AlignConfig::default().reverse_first(false);
    let mut records = vec![];
    let mut templates = vec![];
    for i in 0..5 {
        let template = gen_transducer::generate_seq(&mut rng, 40);
        let first = gen_transducer::simulate(&template, &mut rng, prof);
        let second = gen_transducer::simulate(&template, &mut rng, prof);
        records.push(AlignRecord {
            name: format!("read{}", i),
            template: to_rows(&first),
            complement: to_rows(&second),
        });
        templates.push(template);
    }
    records[2].complement[3].pop();
    let json = serde_json::to_string(&records).unwrap();
    let records: Vec<AlignRecord> = parse_records(json.as_bytes()).unwrap();
    let results = transducer::basecall_records(&records, &config, None);
    assert_eq!(results.len(), 5);
    for (i, (result, template)) in results.iter().zip(templates.iter()).enumerate() {
        match result {
            Ok(call) => {
                assert_ne!(i, 2);
                assert_eq!(&call.sequence, template);
            }
            Err(why) => {
                eprintln!("{}", why);
                assert_eq!(i, 2);
            }
        }
    }
}

#[test]
fn decode_batch() {
    let stay_only: Vec<Vec<Vec<f64>>> = (0..3)
        .map(|_| {
            (0..4)
                .map(|_| {
                    let mut codes = vec![-100f64; 25];
                    codes[0] = 0f64;
                    codes
                })
                .collect()
        })
        .collect();
    let records = vec![
        DecodeRecord {
            name: "stay".to_string(),
            transducer: stay_only,
        },
        DecodeRecord {
            name: "broken".to_string(),
            transducer: vec![vec![vec![0f64; 24]; 4]],
        },
    ];
    let results = transducer::decode_records(&records);
    let decoded = results[0].as_ref().unwrap();
    assert_eq!(decoded.score, 0f64);
    assert_eq!(decoded.bases, vec![0; 4]);
    assert!(decoded.sequence().is_empty());
    assert!(results[1].is_err());
}

#[test]
fn align_batch_skips_reads_without_probability_mass() {
    let probs = |rows: &[[f64; 5]]| -> Vec<Vec<f64>> { rows.iter().map(|r| r.to_vec()).collect() };
    let ok = AlignRecord {
        name: "ok".to_string(),
        template: probs(&[[0.9, 0.025, 0.025, 0.025, 0.025]]),
        complement: probs(&[[0.9, 0.025, 0.025, 0.025, 0.025]]),
    };
    let empty_row = AlignRecord {
        name: "empty_row".to_string(),
        template: probs(&[[0.; 5], [0.5, 0.5, 0., 0., 0.]]),
        complement: probs(&[[0.5, 0.5, 0., 0., 0.]]),
    };
    let records = vec![ok, empty_row];
    let config = transducer::AlignConfig::default().reverse_first(false);
    // A zero floor is an error for each read, not a panic of the batch.
    let results = transducer::basecall_records(&records, &config, Some(0.));
    assert_eq!(results.len(), 2);
    for result in results.iter() {
        let why = result.as_ref().unwrap_err();
        assert_eq!(why.kind(), std::io::ErrorKind::InvalidData);
    }
    // With a floor, the empty row becomes uniform.
    let results = transducer::basecall_records(&records, &config, Some(0.001));
    assert_eq!(results[0].as_ref().unwrap().sequence, b"A".to_vec());
    assert!(results[1].is_ok());
}
