//! Integration tests: a scripted server conversation played through a
//! session, checking the mirrored world after each step.

use skirmish_protocol::{
    BinaryCodec, Codec, Event, Movement, Payload, Player, PlayerHello,
    PlayerHelloConfirm, PlayerId, PlayerJoinedList, PlayerMoved,
    PlayerMovedList, PlayerQuit,
};
use skirmish_session::{Session, SessionConfig, SessionState};

// =========================================================================
// Scripted server
// =========================================================================

/// Builds the buffers a server would send, in the server's framing.
struct ScriptedServer {
    codec: BinaryCodec,
}

impl ScriptedServer {
    fn hello(&self, id: i32) -> Vec<u8> {
        self.codec
            .encode_payload(&Payload::PlayerHello(PlayerHello {
                id: PlayerId(id),
            }))
            .unwrap()
    }

    fn batch(&self, payloads: Vec<Payload>) -> Vec<u8> {
        let events: Vec<Event> = payloads
            .iter()
            .map(|p| {
                let bytes = self.codec.encode_payload(p).unwrap();
                self.codec.unwrap_event(&bytes).unwrap()
            })
            .collect();
        self.codec.wrap_event_list(&events).unwrap()
    }
}

fn player(id: i32, x: f32, y: f32) -> Player {
    Player {
        id: PlayerId(id),
        speed: 200.0,
        x,
        y,
        moving: Movement::STILL,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[test]
fn test_full_conversation_mirrors_server_world() {
    let server = ScriptedServer { codec: BinaryCodec };
    let codec = BinaryCodec;
    let mut session = Session::new(SessionConfig::default());

    session.on_open().unwrap();

    // 1. Handshake: exactly one confirm carrying our id.
    let dispatch = session.receive(&codec, &server.hello(42)).unwrap();
    let reply = codec.unwrap_event(&dispatch.reply.unwrap()).unwrap();
    assert_eq!(reply.kind, "PlayerHelloConfirm");
    assert_eq!(
        codec.decode::<PlayerHelloConfirm>(&reply.data).unwrap().id,
        PlayerId(42)
    );
    assert_eq!(session.state(), SessionState::Active);

    // 2. Everyone already in the world, ourselves included.
    let dispatch = session
        .receive(
            &codec,
            &server.batch(vec![Payload::PlayerJoinedList(PlayerJoinedList {
                players: vec![
                    player(42, 100.0, 100.0),
                    player(7, 300.0, 400.0),
                    player(9, 50.0, 60.0),
                ],
            })]),
        )
        .unwrap();
    assert!(dispatch.reply.is_none());
    assert_eq!(session.registry().len(), 3);
    assert_eq!(session.local_player().unwrap().speed, 200.0);

    // 3. Movement for known and unknown ids, then a quit.
    let moving_left = Player {
        moving: Movement {
            left: true,
            ..Movement::STILL
        },
        ..player(7, 290.0, 400.0)
    };
    session
        .receive(
            &codec,
            &server.batch(vec![
                Payload::PlayerMovedList(PlayerMovedList {
                    players: vec![moving_left, player(11, 1.0, 2.0)],
                }),
                Payload::PlayerQuit(PlayerQuit { id: PlayerId(9) }),
                Payload::PlayerMoved(PlayerMoved {
                    player: player(42, 120.0, 100.0),
                }),
            ]),
        )
        .unwrap();

    let markers = session.registry().snapshot();
    let ids: Vec<i32> = markers.iter().map(|m| m.id.0).collect();
    assert_eq!(ids, vec![7, 11, 42]);

    let seven = session.registry().get(PlayerId(7)).unwrap();
    assert!(seven.moving.left);
    assert_eq!(seven.x, 290.0);
    assert_eq!(session.registry().get(PlayerId(11)).unwrap().speed, 0.0);
    assert_eq!(session.local_player().unwrap().x, 120.0);

    // 4. Server goes away.
    session.on_close();
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.registry().is_empty());
}

#[test]
fn test_world_events_before_hello_are_rejected_until_handshake() {
    let server = ScriptedServer { codec: BinaryCodec };
    let codec = BinaryCodec;
    let mut session = Session::default();
    session.on_open().unwrap();

    // A batch arriving early isn't even an envelope the hello path
    // accepts; it's dropped and the session keeps waiting.
    let early = server.batch(vec![Payload::PlayerQuit(PlayerQuit {
        id: PlayerId(1),
    })]);
    assert!(session.receive(&codec, &early).is_err());
    assert_eq!(session.state(), SessionState::AwaitingHello);

    session.receive(&codec, &server.hello(5)).unwrap();
    assert_eq!(session.local_id(), Some(PlayerId(5)));
}
