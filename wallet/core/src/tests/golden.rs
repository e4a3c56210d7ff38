//!
//! Known-answer tests against transactions accepted by Kaspa mainnet.
//!

use super::*;
use crate::imports::*;
use crate::orchestrator::TokenTransferOrchestrator;
use crate::rpc::RpcTransaction;
use crate::storage::MemoryStore;
use crate::tx::Transfer;
use crate::utils::{parse_units, try_kaspa_str_to_sompi};
use serde_json::json;

const PUBLIC_KEY: &str = "03401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01deb";
const ADDRESS: &str = "kaspa:qyp5qxu7n45c8zx6pqhndy43p4qt02zxchc4723fuclpraty00gpm6c8edeys5s";
const DESTINATION: &str = "kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u";
const WALLET_SCRIPT: &str = "2103401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01debab";

const COMMIT_SIGNATURES: [&str; 2] = [
    "be3464a493fa8e8d3a4f630464904336a3b542ec73e6fadade8a500151c9dbbc6c9e65ea768bd02f5924ae80854cb3fbff71cae5040e7b54afcabb32a8fabf8f",
    "10da4a8a8424f3863a74cf99efdc6399717d84b44e054d711cf852c61b0de74f17e162d2d0fa4ddd7d34dda4d54e6d2c11e702900f8a5737aa55882188b2f64f",
];
const REVEAL_SIGNATURES: [&str; 1] = [
    "0cc61353440a03bd3239c6183916c36d895512ebb23b52cfb937e1c54c0b216028718515855b0a5202488d396503c3e495f6e3b8f0760006c0bad5f8636ee2db",
];
const REDEEM_SCRIPT: &str = "2103401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01debab0063076b6173706c65785100004c8b7b22616d74223a22313030303030303030222c226f70223a227472616e73666572222c2270223a226b72632d3230222c227469636b223a2247474d46222c22746f223a226b617370613a717970746a7735306b716370366137786d78386a75763078766d67746d656d3466766c74653838636c74326b616661733836336e617273707639736a333475227d68";
const COMMIT_TRANSACTION_ID: &str = "81425d682c91f2e6c7a59052d70fe30f127c7608977812ed8249dae985a634e0";

fn token_builder() -> crate::tx::TransactionBuilder {
    wallet_builder(
        &hex(PUBLIC_KEY),
        &[
            ("113471470e4ad43324aad78880b092e153adee6cfc1236fbf17f715daa2071be", 1, 39732557),
            ("f8107be5d92cc4266a6def91fd30b3b8f7690a2f932eab6c254031caf8bbcacf", 0, 39997245),
        ],
    )
}

fn token_transfer() -> Transfer {
    Transfer::token("GGMF", parse_units("1", 8).unwrap(), 16573, 4100, ADDRESS, DESTINATION)
}

fn expected_commit() -> serde_json::Value {
    json!({
        "inputs": [
            {
                "previousOutpoint": { "transactionId": "113471470e4ad43324aad78880b092e153adee6cfc1236fbf17f715daa2071be", "index": 1 },
                "signatureScript": format!("41{}01", COMMIT_SIGNATURES[0])
            },
            {
                "previousOutpoint": { "transactionId": "f8107be5d92cc4266a6def91fd30b3b8f7690a2f932eab6c254031caf8bbcacf", "index": 0 },
                "signatureScript": format!("41{}01", COMMIT_SIGNATURES[1])
            }
        ],
        "outputs": [
            {
                "amount": 20004100,
                "scriptPublicKey": { "version": 0, "scriptPublicKey": "aa201775d37a12f5ae0835322a24ce3d99a4a7ba803ccbb4e0fc56498421fc5db94f87" }
            },
            { "amount": 59709129, "scriptPublicKey": { "version": 0, "scriptPublicKey": WALLET_SCRIPT } }
        ]
    })
}

fn expected_reveal() -> serde_json::Value {
    json!({
        "inputs": [{
            "previousOutpoint": { "transactionId": COMMIT_TRANSACTION_ID, "index": 0 },
            "signatureScript": format!("41{}014cbe{}", REVEAL_SIGNATURES[0], REDEEM_SCRIPT)
        }],
        "outputs": [
            { "amount": 20000000, "scriptPublicKey": { "version": 0, "scriptPublicKey": WALLET_SCRIPT } }
        ]
    })
}

#[test]
fn test_coin_transfer() {
    let builder = wallet_builder(
        &hex(PUBLIC_KEY),
        &[
            ("414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134", 0, 20000000),
            ("5f7deb4c490de237e0dcc9dae4216f80247a671ca30eaab411d2963c6e070113", 1, 19736854),
            ("c97e84228b68aa37a0c51c5a93f0005eb9543a353b6cf59c33052eab33f16e0b", 0, 20000000),
        ],
    );
    assert_eq!(builder.address().to_string(), ADDRESS);

    let amount = try_kaspa_str_to_sompi("0.2").unwrap().unwrap();
    let fee = try_kaspa_str_to_sompi("0.00004297").unwrap().unwrap();
    let unsigned = builder.build_for_sign(&Transfer::coin(amount, fee, ADDRESS, DESTINATION)).unwrap();
    assert_eq!(
        unsigned.hashes,
        hashes(&[
            "80a72a2ba65dba21a64527015ceab6312f5da668cd83285fa63bcd55b6f5610d",
            "f48c41fa6d58273438278100ab0ae3e0a07bfedd1f00561030873a381421dd08",
            "9e4d470b5d4888d4b0e036281142af776f3a1b7d9a1c4b2d8550f2ecd41d7bea",
        ])
    );

    let signatures = [
        "401dc920bf148e0fcdcfae009b9dc805553f74f883aaff8a5c0445a1169d89196035a177eb33dc57076fe6c4453843e11e36d229ee895bfdd18f7b63131d5889",
        "0a51d8d2e737f1cf8d3440e31736aa07a230a3ec4f811d50f8abc6f86369a27c3425813510a06f9f5648afda58d1e15a91be29d41779c16d49415cfe962c9095",
        "c0aebb30e5638c7f98d870ab40f43fe2a6bdec0ed848f8e9622cb8733df9988278501064c5876e978e1c9fbd78bf96111b94487c5e9fbb99399342a9fb16667b",
    ];
    let transaction = builder.build_for_send(&unsigned, &signatures.map(hex)).unwrap();

    let expected = json!({
        "inputs": [
            {
                "previousOutpoint": { "transactionId": "414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134", "index": 0 },
                "signatureScript": format!("41{}01", signatures[0])
            },
            {
                "previousOutpoint": { "transactionId": "5f7deb4c490de237e0dcc9dae4216f80247a671ca30eaab411d2963c6e070113", "index": 1 },
                "signatureScript": format!("41{}01", signatures[1])
            },
            {
                "previousOutpoint": { "transactionId": "c97e84228b68aa37a0c51c5a93f0005eb9543a353b6cf59c33052eab33f16e0b", "index": 0 },
                "signatureScript": format!("41{}01", signatures[2])
            }
        ],
        "outputs": [
            {
                "amount": 20000000,
                "scriptPublicKey": { "version": 0, "scriptPublicKey": "2102b93a8fb0301d77c6d98f2e31e666d0bde7754b3ebc9cf8fad56ea7b03ea33e8eab" }
            },
            { "amount": 39732557, "scriptPublicKey": { "version": 0, "scriptPublicKey": WALLET_SCRIPT } }
        ]
    });
    assert_eq!(serde_json::to_value(RpcTransaction::from(&transaction)).unwrap(), expected);
}

#[test]
fn test_krc20_transfer() {
    let builder = token_builder();
    let (group, meta) = builder.build_for_sign_krc20(&token_transfer()).unwrap();

    let all_hashes = [group.commit_hashes(), group.reveal_hashes()].concat();
    assert_eq!(
        all_hashes,
        hashes(&[
            "3f6807d0e927233f6e792db8f4e8b932836a80d45d386cba63b17850e0470fd4",
            "2788f1ddc6cbf080310d73d316702a5c61912ffdd86ea076db1c8f989ca48b84",
            "7b0180298292e4c6937377f8666d8b119778f61611f4e51afb2a5941ff4aa88c",
        ])
    );
    assert_eq!(meta.redeem_script.script(), hex(REDEEM_SCRIPT).as_slice());
    assert_eq!(meta.incomplete_params.commit_transaction_id.to_string(), COMMIT_TRANSACTION_ID);
    assert_eq!(meta.incomplete_params.target_output_amount, 20004100);

    let commit = builder.build_for_send(&group.commit, &COMMIT_SIGNATURES.map(hex)).unwrap();
    assert_eq!(serde_json::to_value(RpcTransaction::from(&commit)).unwrap(), expected_commit());
    assert_eq!(commit.id().to_string(), COMMIT_TRANSACTION_ID);

    let reveal = builder.build_reveal_for_send(&group.reveal, &meta.redeem_script, &REVEAL_SIGNATURES.map(hex)).unwrap();
    assert_eq!(serde_json::to_value(RpcTransaction::from(&reveal)).unwrap(), expected_reveal());
}

#[tokio::test]
async fn test_krc20_transfer_orchestrated() {
    let broadcaster = Arc::new(MockBroadcaster::new());
    let orchestrator = TokenTransferOrchestrator::new(
        Arc::new(token_builder()),
        Arc::new(FixedSigner::new(&[&COMMIT_SIGNATURES, &REVEAL_SIGNATURES])),
        broadcaster.clone(),
        Arc::new(MemoryStore::new()),
    );

    let receipt = orchestrator.send(&token_transfer()).await.unwrap();
    assert_eq!(receipt.commit_transaction_id.to_string(), COMMIT_TRANSACTION_ID);
    assert!(!receipt.resumed);

    let transactions = broadcaster.transactions();
    assert_eq!(transactions.len(), 2);
    assert_eq!(serde_json::to_value(&transactions[0]).unwrap(), expected_commit());
    assert_eq!(serde_json::to_value(&transactions[1]).unwrap(), expected_reveal());
    assert_eq!(receipt.reveal_transaction_id, transaction_id(&transactions[1]));
}
