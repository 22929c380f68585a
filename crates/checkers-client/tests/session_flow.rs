//! End-to-end session tests: a `ClientController` talking to a scripted
//! server over the in-memory transport.

use checkers_client::client_controller::{ClientController, PollResult};
use checkers_client::game_state::GameEvent;
use checkers_client::transport::MemoryTransport;
use checkers_core::board::{Board, CELL_COUNT, Cell};
use checkers_core::perspective::{Local, Position};
use checkers_core::protocol::{ClientMessage, Color, ServerMessage, ServerSnapshot};
use tokio_test::assert_ok;

fn local(row: u8, col: u8) -> Position<Local> {
    Position::new(row, col).unwrap()
}

fn snapshot_frame(turn: Color, just_take: Option<(u8, u8)>, pieces: &[(usize, Cell)]) -> String {
    let mut tokens = vec![Cell::Empty.glyph(); CELL_COUNT];
    for (index, cell) in pieces {
        tokens[*index] = cell.glyph();
    }
    let snapshot = ServerSnapshot {
        board: Board::decode(&tokens.concat()).unwrap(),
        turn,
        just_take: just_take.map(|(r, c)| Position::new(r, c).unwrap()),
    };
    ServerMessage::Snapshot(snapshot).to_string()
}

#[tokio::test]
async fn black_player_plays_a_capture_chain() {
    let (transport, mut peer) = MemoryTransport::pair();
    let mut ctrl = ClientController::from_transport(transport);

    assert_ok!(peer.to_client.send("black".to_string()));
    let PollResult::Updated(changed) = ctrl.recv().await else {
        panic!("expected color assignment");
    };
    assert!(changed.color);
    assert_eq!(ctrl.state.color(), Some(Color::Black));

    // Black man at absolute (2,1) is local (5,6) for the black viewer.
    let frame = snapshot_frame(Color::Black, None, &[(17, Cell::BlackMan), (26, Cell::WhiteMan)]);
    assert_ok!(peer.to_client.send(frame));
    let PollResult::Updated(changed) = ctrl.recv().await else {
        panic!("expected snapshot");
    };
    assert!(changed.board);
    assert!(ctrl.state.is_our_turn());
    let board = &ctrl.state.snapshot.as_ref().unwrap().board;
    assert_eq!(board.get(local(5, 6)), Cell::BlackMan);
    assert_eq!(board.get(local(4, 5)), Cell::WhiteMan);

    assert_eq!(ctrl.click(local(5, 6)), None);
    let sent = ctrl.click(local(3, 4));
    assert!(matches!(sent, Some(ClientMessage::Move { .. })));
    assert_eq!(peer.from_client.recv().await.as_deref(), Some("2,1,4,3"));

    // Server accepts the capture and keeps black mid chain.
    let frame = snapshot_frame(Color::Black, Some((4, 3)), &[(35, Cell::BlackMan)]);
    assert_ok!(peer.to_client.send(frame));
    assert!(matches!(ctrl.recv().await, PollResult::Updated(_)));
    assert!(ctrl.state.can_skip());
    assert_eq!(
        ctrl.state.snapshot.as_ref().unwrap().just_take,
        Some(local(3, 4))
    );

    assert_eq!(ctrl.skip(), Some(ClientMessage::Skip));
    assert_eq!(peer.from_client.recv().await.as_deref(), Some("skip"));
}

#[tokio::test]
async fn malformed_frame_keeps_previous_snapshot() {
    let (transport, peer) = MemoryTransport::pair();
    let mut ctrl = ClientController::from_transport(transport);

    assert_ok!(peer.to_client.send("white".to_string()));
    assert_ok!(peer.to_client.send(snapshot_frame(Color::White, None, &[(0, Cell::WhiteMan)])));
    ctrl.recv().await;
    ctrl.recv().await;
    let before = ctrl.state.snapshot.clone();
    assert!(before.is_some());

    assert_ok!(peer.to_client.send(r#"{"turn":"white","board":"oops"}"#.to_string()));
    assert!(matches!(ctrl.recv().await, PollResult::Rejected(_)));
    assert_eq!(ctrl.state.snapshot, before);
    assert!(matches!(
        ctrl.state.events.back(),
        Some(GameEvent::FrameRejected { .. })
    ));
}

#[tokio::test]
async fn full_room_then_disconnect() {
    let (transport, mut peer) = MemoryTransport::pair();
    let mut ctrl = ClientController::from_transport(transport);

    assert_ok!(peer.to_client.send("full".to_string()));
    let PollResult::Updated(changed) = ctrl.recv().await else {
        panic!("expected full notice");
    };
    assert!(changed.notice);
    assert!(ctrl.state.room_full);
    assert_eq!(ctrl.state.color(), None);
    assert!(ctrl.state.is_waiting());

    drop(peer.to_client);
    assert!(matches!(ctrl.recv().await, PollResult::Disconnected));
    assert!(!ctrl.state.connected);
    assert!(matches!(ctrl.try_recv(), PollResult::Disconnected));

    assert_eq!(ctrl.click(local(0, 0)), None);
    assert_eq!(ctrl.skip(), None);
    assert!(peer.from_client.try_recv().is_err());
}
