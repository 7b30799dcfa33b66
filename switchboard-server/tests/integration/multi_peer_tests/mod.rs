mod test_room_switching;
