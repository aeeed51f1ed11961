mod tests {
    use myrtio_tapper::{Button, EdgeDetector, should_act};

    const A: [Button; 3] = [Button::Red, Button::White, Button::Blue];
    const B: [Button; 3] = [Button::Red, Button::Blue, Button::Blue];

    #[test]
    fn test_first_vector_always_acts() {
        assert!(should_act(&A, None));
        assert!(EdgeDetector::<3>::new().should_act(&A));
    }

    #[test]
    fn test_equal_vectors_do_not_act() {
        assert!(!should_act(&A, Some(&A)));
        assert!(should_act(&B, Some(&A)));
    }

    #[test]
    fn test_sequence_fires_on_changes_only() {
        let mut edge = EdgeDetector::new();
        let mut fired = Vec::new();
        for vector in [A, A, B, B, A] {
            if edge.should_act(&vector) {
                fired.push(vector);
                edge.commit(vector);
            }
        }
        assert_eq!(fired, vec![A, B, A]);
    }

    #[test]
    fn test_reset_forgets_previous() {
        let mut edge = EdgeDetector::new();
        edge.commit(A);
        assert_eq!(edge.previous(), Some(&A));
        assert!(!edge.should_act(&A));

        edge.reset();
        assert_eq!(edge.previous(), None);
        assert!(edge.should_act(&A));
    }
}
